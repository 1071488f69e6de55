pub mod error;
pub mod ns;
pub mod obj;
pub mod rt;
pub mod util;
pub mod val;
