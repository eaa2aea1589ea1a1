use super::Tensor;
use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_new_and_shape() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.rows(), 2);
    assert_eq!(t.cols(), 3);
    assert_eq!(t[[1, 0]], 4.0);
    assert_eq!(t.row(1), vec![4.0, 5.0, 6.0]);
}

#[test]
#[should_panic]
fn test_new_with_wrong_len() {
    let _ = Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]);
}

#[test]
fn test_mat_mul_and_transpose() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[5.0, 6.0], &[2, 1]);
    let c = a.mat_mul(&b);
    assert_eq!(c, Tensor::new(&[17.0, 39.0], &[2, 1]));
    assert_eq!(b.transpose().shape(), &[1, 2]);
}

#[test]
fn test_elementwise_ops() {
    let a = Tensor::new(&[1.0, -2.0], &[1, 2]);
    let b = Tensor::new(&[3.0, 4.0], &[1, 2]);
    assert_eq!(&a + &b, Tensor::new(&[4.0, 2.0], &[1, 2]));
    assert_eq!(&a - &b, Tensor::new(&[-2.0, -6.0], &[1, 2]));
    assert_eq!(&a * &b, Tensor::new(&[3.0, -8.0], &[1, 2]));
    assert_eq!(2.0 * &a, Tensor::new(&[2.0, -4.0], &[1, 2]));
    assert_eq!(-&a, Tensor::new(&[-1.0, 2.0], &[1, 2]));
    assert_eq!(a.relu(), Tensor::new(&[1.0, 0.0], &[1, 2]));

    let mut c = a.clone();
    c += &b;
    c *= 0.5;
    assert_eq!(c, Tensor::new(&[2.0, 1.0], &[1, 2]));
}

#[test]
fn test_reductions() {
    let t = Tensor::new(&[1.0, -2.0, 3.0, 6.0], &[2, 2]);
    assert_eq!(t.min(), Some(-2.0));
    assert_eq!(t.max(), Some(6.0));
    assert_abs_diff_eq!(t.mean(), 2.0);
    assert_eq!(t.sum_rows(), Tensor::new(&[4.0, 4.0], &[1, 2]));
    assert_eq!(Tensor::zeros(&[0, 3]).min(), None);
    assert_eq!(Tensor::full(&[1, 1], 7.0).get_data_number(), Some(7.0));
    assert_eq!(t.get_data_number(), None);
}

#[test]
fn test_row_ops() {
    let top = Tensor::new(&[1.0, 2.0], &[1, 2]);
    let bottom = Tensor::new(&[3.0, 4.0, 5.0, 6.0], &[2, 2]);
    let joined = Tensor::concat_rows(&top, &bottom).unwrap();
    assert_eq!(joined.shape(), &[3, 2]);
    assert_eq!(joined.row(2), vec![5.0, 6.0]);
    assert_eq!(joined.slice_rows(1, 3), bottom);
    assert_eq!(joined.select_rows(&[2, 0]).to_vec(), vec![5.0, 6.0, 1.0, 2.0]);
    assert!(Tensor::concat_rows(&top, &Tensor::zeros(&[1, 3])).is_none());
}

#[test]
fn test_truncated_normal_stays_within_two_sigma() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = Tensor::truncated_normal(0.0, 0.1, &[50, 40], &mut rng);
    assert_eq!(t.shape(), &[50, 40]);
    assert!(t.to_vec().iter().all(|v| v.abs() <= 0.2 + 1e-6));
    assert_abs_diff_eq!(t.mean(), 0.0, epsilon = 0.01);
}
