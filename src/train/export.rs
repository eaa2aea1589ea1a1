//! 隐空间导出：每个样本一行，先是隐向量各维，最后是标签，空格分隔，
//! 数值格式与 `numpy.savetxt` 默认的 `%.18e` 一致（如 `-1.500000000000000000e+00`）

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::tensor::Tensor;

/// `%.18e`：尾数 18 位小数，指数带符号且至少两位
pub fn format_scientific(value: f64) -> String {
    // 与 C printf 一致：nan / inf / -inf
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let formatted = format!("{value:.18e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => formatted,
        },
        None => formatted,
    }
}

pub fn write_latent<P: AsRef<Path>>(path: P, latent: &Tensor, labels: &[u8]) -> std::io::Result<()> {
    let path = path.as_ref();
    if latent.rows() != labels.len() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("隐向量有{}行，标签有{}个", latent.rows(), labels.len()),
        ));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for (row, &label) in labels.iter().enumerate() {
        let line: Vec<String> = latent
            .row(row)
            .into_iter()
            .map(|v| format_scientific(f64::from(v)))
            .chain(std::iter::once(format_scientific(f64::from(label))))
            .collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;
    tracing::info!("已导出{}行隐向量到{}", labels.len(), path.display());
    Ok(())
}
