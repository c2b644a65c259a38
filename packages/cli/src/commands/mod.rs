pub mod apply;
pub mod check;
pub mod init;
pub mod tree;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use tree::{tree, TreeArgs};
