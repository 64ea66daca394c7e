pub mod bog;
pub use self::bog::{Bog, BogInstallment};

pub mod credo;
pub use self::credo::Credo;

pub mod tbc;
pub use self::tbc::Tbc;

pub mod tbc_installment;
pub use self::tbc_installment::TbcInstallment;
