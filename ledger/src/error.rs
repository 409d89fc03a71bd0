use poi_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds in {account}: need {needed}, available {available}")]
    InsufficientFunds {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in balance update")]
    Overflow,
}
