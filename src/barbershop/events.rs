//! Flujo observable de la barbería: cada transición de estado produce un
//! `ShopEvent` junto con una foto de la ocupación tomada bajo el lock.
//!
//! Los consumidores (logger, tests, otro hilo) solo observan; nunca
//! participan de la coordinación.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use tracing::{debug, info, trace};

pub type CustomerId = usize;
pub type BarberId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopEvent {
    Admitted { customer: CustomerId },
    Rejected { customer: CustomerId },
    SeatedOnCouch { customer: CustomerId },
    SeatedInChair { customer: CustomerId },
    ServiceStarted { barber: BarberId, customer: CustomerId },
    ServiceFinished { barber: BarberId, customer: CustomerId },
    PaymentRequested { customer: CustomerId, barber: BarberId },
    PaymentCompleted { customer: CustomerId, barber: BarberId },
    Departed { customer: CustomerId },
    BarberAsleep { barber: BarberId },
    BarberRetired { barber: BarberId },
}

impl ShopEvent {
    pub fn customer(&self) -> Option<CustomerId> {
        match *self {
            ShopEvent::Admitted { customer }
            | ShopEvent::Rejected { customer }
            | ShopEvent::SeatedOnCouch { customer }
            | ShopEvent::SeatedInChair { customer }
            | ShopEvent::ServiceStarted { customer, .. }
            | ShopEvent::ServiceFinished { customer, .. }
            | ShopEvent::PaymentRequested { customer, .. }
            | ShopEvent::PaymentCompleted { customer, .. }
            | ShopEvent::Departed { customer } => Some(customer),
            ShopEvent::BarberAsleep { .. } | ShopEvent::BarberRetired { .. } => None,
        }
    }

    pub fn barber(&self) -> Option<BarberId> {
        match *self {
            ShopEvent::ServiceStarted { barber, .. }
            | ShopEvent::ServiceFinished { barber, .. }
            | ShopEvent::PaymentRequested { barber, .. }
            | ShopEvent::PaymentCompleted { barber, .. }
            | ShopEvent::BarberAsleep { barber }
            | ShopEvent::BarberRetired { barber } => Some(barber),
            _ => None,
        }
    }
}

/// Foto de los contadores compartidos en el instante de un evento.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    pub waiting: usize,
    pub couch: usize,
    pub chairs: usize,
    pub cashier_free: bool,
    pub pending: usize,
}

impl Occupancy {
    pub fn inside(&self) -> usize {
        self.waiting + self.couch + self.chairs
    }
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: ShopEvent, occupancy: Occupancy);
}

/// Consumidor por defecto: una línea de log por transición.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: ShopEvent, occupancy: Occupancy) {
        match event {
            ShopEvent::Admitted { customer } => info!(
                "[Cliente {}] Entró a la barbería. Total: {}",
                customer,
                occupancy.inside()
            ),
            ShopEvent::Rejected { customer } => {
                info!("[Cliente {}] Barbería llena, me voy.", customer)
            }
            ShopEvent::SeatedOnCouch { customer } => {
                info!("[Cliente {}] Me senté en el sofá.", customer)
            }
            ShopEvent::SeatedInChair { customer } => {
                info!("[Cliente {}] Me senté en la silla.", customer)
            }
            ShopEvent::ServiceStarted { barber, customer } => info!(
                "[Barbero {}] Cortando el pelo al cliente {}.",
                barber, customer
            ),
            ShopEvent::ServiceFinished { barber, customer } => info!(
                "[Barbero {}] Esperando el pago del cliente {}.",
                barber, customer
            ),
            ShopEvent::PaymentRequested { customer, .. } => {
                info!("[Cliente {}] Pagando el corte.", customer)
            }
            ShopEvent::PaymentCompleted { customer, barber } => info!(
                "[Cliente {}] Pago al barbero {} completado.",
                customer, barber
            ),
            ShopEvent::Departed { customer } => {
                info!("[Cliente {}] Me fui de la barbería.", customer)
            }
            ShopEvent::BarberAsleep { barber } => debug!("[Barbero {}] Durmiendo...", barber),
            ShopEvent::BarberRetired { barber } => {
                debug!("[Barbero {}] Terminó la jornada.", barber)
            }
        }
        trace!("[Barbería] {:?}", occupancy);
    }
}

/// Guarda la línea de tiempo completa en memoria, para inspeccionarla al
/// final de una corrida.
#[derive(Debug, Default)]
pub struct RecordingSink {
    timeline: Mutex<Vec<(ShopEvent, Occupancy)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn timeline(&self) -> Vec<(ShopEvent, Occupancy)> {
        match self.timeline.lock() {
            Ok(timeline) => timeline.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn events(&self) -> Vec<ShopEvent> {
        self.timeline().into_iter().map(|(event, _)| event).collect()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: ShopEvent, occupancy: Occupancy) {
        if let Ok(mut timeline) = self.timeline.lock() {
            timeline.push((event, occupancy));
        }
    }
}

/// Reenvía cada evento por un canal, para un suscriptor en otro hilo.
/// Si el receptor ya no existe los eventos se descartan.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<(ShopEvent, Occupancy)>,
}

impl ChannelSink {
    pub fn new(sender: Sender<(ShopEvent, Occupancy)>) -> Self {
        ChannelSink { sender }
    }
}

impl EventSink for ChannelSink {
    fn record(&self, event: ShopEvent, occupancy: Occupancy) {
        let _ = self.sender.send((event, occupancy));
    }
}
