pub mod cold_move;
pub mod withdraw;

pub use cold_move::{ColdMoveEvent, ColdMoveState};
pub use withdraw::{WithdrawEvent, WithdrawReceipt, WithdrawState};
