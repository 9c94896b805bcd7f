use std::{error::Error, fmt};

#[derive(Debug, PartialEq, Eq)]
pub enum BarberShopError {
    ArgsParsingError(String),
    InvalidConfig(String),
    PoisonedLock,
    ShopAbandoned,
    ThreadPanicked(String),
}

impl fmt::Display for BarberShopError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl Error for BarberShopError {}

// Cualquier lock envenenado (de `lock()` o de `wait_while`) se reporta igual:
// el estado compartido ya no es confiable.
impl<T> From<std::sync::PoisonError<T>> for BarberShopError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        BarberShopError::PoisonedLock
    }
}
