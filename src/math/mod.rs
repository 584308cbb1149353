pub mod kernel;

pub use kernel::{
    add, argmax, dot, dot_blocked, matmul, matmul_with_block, matvec, matvec_with_block, multiply,
    relu_in_place, scale, softmax, MATMUL_BLOCK, MATVEC_BLOCK,
};
