use tracing::trace;

use super::error::BarberShopError;
use super::events::{BarberId, CustomerId};
use super::monitor::{Admission, ShopMonitor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomerOutcome {
    Served { barber: BarberId },
    Rejected,
}

/// Recorrido completo de un cliente: entrar, sofá, silla, pagar e irse.
/// Que lo rechacen en la puerta es un resultado válido, no un error.
pub fn visit(id: CustomerId, shop: &ShopMonitor) -> Result<CustomerOutcome, BarberShopError> {
    if shop.enter(id)? == Admission::Rejected {
        return Ok(CustomerOutcome::Rejected);
    }
    shop.sit_on_couch(id)?;
    shop.sit_in_chair(id)?;

    // esperamos en la silla hasta que nuestro barbero nos cobre
    let barber = shop.pay(id)?;
    shop.leave(id, barber)?;
    trace!("[Cliente {}] Atendido por el barbero {}", id, barber);
    Ok(CustomerOutcome::Served { barber })
}
