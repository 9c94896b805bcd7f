//! Ciclo de vida de un barbero como máquina de estados explícita:
//! `Asleep -> Serving -> AwaitingPayment -> {Asleep | Retired}`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use super::error::BarberShopError;
use super::events::{BarberId, CustomerId};
use super::monitor::ShopMonitor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarberState {
    Asleep,
    Serving(CustomerId),
    AwaitingPayment(CustomerId),
    Retired,
}

pub struct Barber {
    id: BarberId,
    shop: Arc<ShopMonitor>,
    haircut_duration: Duration,
    state: BarberState,
    haircuts: usize,
}

impl Barber {
    pub fn new(id: BarberId, shop: Arc<ShopMonitor>, haircut_duration: Duration) -> Self {
        Barber {
            id,
            shop,
            haircut_duration,
            state: BarberState::Asleep,
            haircuts: 0,
        }
    }

    pub fn state(&self) -> BarberState {
        self.state
    }

    pub fn haircuts(&self) -> usize {
        self.haircuts
    }

    /// Avanza una transición. Al volver a `Asleep` lo primero que se revisa
    /// es si quedan clientes pendientes, así el retiro se decide siempre en
    /// el mismo lugar.
    pub fn step(&mut self) -> Result<BarberState, BarberShopError> {
        let next = match self.state {
            BarberState::Asleep => match self.shop.wait_for_customer(self.id)? {
                Some(customer) => BarberState::Serving(customer),
                None => BarberState::Retired,
            },
            BarberState::Serving(customer) => {
                self.cut_hair(customer);
                BarberState::AwaitingPayment(customer)
            }
            BarberState::AwaitingPayment(customer) => {
                self.shop.collect_payment(self.id, customer)?;
                self.haircuts += 1;
                BarberState::Asleep
            }
            BarberState::Retired => return Ok(BarberState::Retired),
        };
        if next == BarberState::Retired {
            self.shop.retire(self.id)?;
        }
        self.state = next;
        Ok(next)
    }

    /// Trabaja hasta retirarse y devuelve cuántos cortes hizo.
    pub fn run(mut self) -> Result<usize, BarberShopError> {
        while self.step()? != BarberState::Retired {}
        Ok(self.haircuts)
    }

    // el corte no toca el estado compartido: se hace sin el lock
    fn cut_hair(&self, customer: CustomerId) {
        debug!("[Barbero {}] Cortando pelo al cliente {}", self.id, customer);
        thread::sleep(self.haircut_duration);
    }
}
