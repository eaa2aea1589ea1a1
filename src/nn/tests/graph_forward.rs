/*
 * @Date         : 2026-10-19
 * @Description  : Graph 构图与前向传播测试
 */

use crate::nn::{DynShape, Graph, GraphError, Init};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_input_node_accepts_any_batch_size() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(3, Some("x")).unwrap();
    assert_eq!(graph.get_node_expected_shape(x).unwrap(), DynShape::dynamic(3));

    graph.set_node_value(x, &Tensor::zeros(&[1, 3])).unwrap();
    graph.set_node_value(x, &Tensor::zeros(&[7, 3])).unwrap();

    let result = graph.set_node_value(x, &Tensor::zeros(&[7, 4]));
    assert!(matches!(result, Err(GraphError::ShapeMismatch { .. })));
}

#[test]
fn test_duplicate_node_name() {
    let mut graph = Graph::new();
    graph.new_input_node(3, Some("x")).unwrap();
    let result = graph.new_input_node(3, Some("x"));
    assert!(matches!(result, Err(GraphError::DuplicateNodeName(name)) if name == "x"));
}

#[test]
fn test_auto_generated_names() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(3, None).unwrap();
    let t = graph.new_tanh_node(x, None).unwrap();
    assert_eq!(graph.get_node_name(x).unwrap(), "input_0");
    assert_eq!(graph.get_node_name(t).unwrap(), "tanh_1");
    assert_eq!(graph.get_node_by_name("tanh_1"), Some(t));
}

#[test]
fn test_mat_mul_shape_mismatch_at_construction() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(3, Some("x")).unwrap();
    let w = graph
        .new_parameter_node(&[4, 2], Init::Zeros, Some("w"))
        .unwrap();
    let result = graph.new_mat_mul_node(x, w, None);
    assert!(matches!(result, Err(GraphError::ShapeMismatch { .. })));
}

#[test]
fn test_forward_without_input_value() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(2, Some("x")).unwrap();
    let y = graph.new_tanh_node(x, None).unwrap();
    assert!(matches!(
        graph.forward(y),
        Err(GraphError::ComputationError(_))
    ));
}

#[test]
fn test_forward_affine_tanh_relu() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(2, Some("x")).unwrap();
    let w = graph
        .new_parameter_node(&[2, 2], Init::Zeros, Some("w"))
        .unwrap();
    let b = graph
        .new_parameter_node(&[1, 2], Init::Zeros, Some("b"))
        .unwrap();
    graph
        .set_node_value(w, &Tensor::new(&[1.0, -1.0, 2.0, 0.5], &[2, 2]))
        .unwrap();
    graph
        .set_node_value(b, &Tensor::new(&[0.5, -3.0], &[1, 2]))
        .unwrap();

    let xw = graph.new_mat_mul_node(x, w, None).unwrap();
    let z = graph.new_add_bias_node(xw, b, None).unwrap();
    let t = graph.new_tanh_node(z, None).unwrap();
    let r = graph.new_relu_node(z, None).unwrap();

    graph
        .set_node_value(x, &Tensor::new(&[1.0, 1.0, 0.0, 2.0], &[2, 2]))
        .unwrap();
    graph.forward_nodes(&[t, r]).unwrap();

    // z = [[3.5, -3.5], [4.5, -2.0]]
    let z_value = graph.get_node_value(z).unwrap().unwrap();
    assert_eq!(z_value, &Tensor::new(&[3.5, -3.5, 4.5, -2.0], &[2, 2]));
    let r_value = graph.get_node_value(r).unwrap().unwrap();
    assert_eq!(r_value, &Tensor::new(&[3.5, 0.0, 4.5, 0.0], &[2, 2]));
    let t_value = graph.get_node_value(t).unwrap().unwrap();
    assert_abs_diff_eq!(t_value[[0, 0]], 3.5f32.tanh(), epsilon = 1e-6);
    assert_abs_diff_eq!(t_value[[1, 1]], (-2.0f32).tanh(), epsilon = 1e-6);
}

#[test]
fn test_non_leaf_value_cannot_be_set() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(2, Some("x")).unwrap();
    let y = graph.new_relu_node(x, None).unwrap();
    let result = graph.set_node_value(y, &Tensor::zeros(&[1, 2]));
    assert!(matches!(result, Err(GraphError::InvalidOperation(_))));
}

#[test]
fn test_weighted_sum_requires_scalars() {
    let mut graph = Graph::new();
    let x = graph.new_input_node(2, Some("x")).unwrap();
    assert!(graph.new_weighted_sum_node(&[(x, 1.0)], None).is_err());
    assert!(graph.new_weighted_sum_node(&[], None).is_err());
}

#[test]
fn test_trainable_nodes_in_creation_order() {
    let mut graph = Graph::new_with_seed(1);
    let a = graph.new_parameter_node(&[1, 1], Init::Zeros, None).unwrap();
    let _x = graph.new_input_node(1, None).unwrap();
    let b = graph.new_parameter_node(&[1, 1], Init::Zeros, None).unwrap();
    assert_eq!(graph.get_trainable_nodes(), vec![a, b]);
}

#[test]
fn test_seeded_init_is_reproducible() {
    let init = Init::TruncatedNormal { std_dev: 0.1 };
    let mut g1 = Graph::new_with_seed(42);
    let mut g2 = Graph::new_with_seed(42);
    let p1 = g1.new_parameter_node(&[4, 4], init, None).unwrap();
    let p2 = g2.new_parameter_node(&[4, 4], init, None).unwrap();
    assert_eq!(
        g1.get_node_value(p1).unwrap(),
        g2.get_node_value(p2).unwrap()
    );
}
