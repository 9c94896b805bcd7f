//! Monitor de la barbería: todo el estado compartido vive detrás de un único
//! mutex y cada espera es una variable de condición.
//!
//! Las variables de condición no están asociadas a un cliente o barbero en
//! particular, así que todo el que despierta vuelve a chequear su condición.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use super::config::ShopConfig;
use super::error::BarberShopError;
use super::events::{BarberId, CustomerId, EventSink, Occupancy, ShopEvent};

/// En qué punto está el cliente sentado en una silla.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChairStage {
    AwaitingBarber,
    InService(BarberId),
    ReadyToPay(BarberId),
    Paying(BarberId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected,
}

#[derive(Debug)]
struct ShopState {
    waiting: usize,
    couch: usize,
    // la cantidad de sillas ocupadas es el tamaño del mapa
    chairs: HashMap<CustomerId, ChairStage>,
    cashier_free: bool,
    pending: usize,
    // algún cliente o barbero murió a mitad de camino: nadie debe seguir esperando
    abandoned: bool,
}

impl ShopState {
    fn inside(&self) -> usize {
        self.waiting + self.couch + self.chairs.len()
    }

    fn closed(&self) -> bool {
        self.pending == 0
    }

    fn check_abandoned(&self) -> Result<(), BarberShopError> {
        if self.abandoned {
            return Err(BarberShopError::ShopAbandoned);
        }
        Ok(())
    }

    fn stage(&self, customer: CustomerId) -> Option<ChairStage> {
        self.chairs.get(&customer).copied()
    }

    // sin orden de llegada: cualquier cliente sin barbero sirve
    fn next_unclaimed(&self) -> Option<CustomerId> {
        self.chairs
            .iter()
            .filter(|(_, stage)| **stage == ChairStage::AwaitingBarber)
            .map(|(customer, _)| *customer)
            .min()
    }

    fn payable_to(&self, customer: CustomerId) -> Option<BarberId> {
        match self.stage(customer) {
            Some(ChairStage::ReadyToPay(barber)) if self.cashier_free => Some(barber),
            _ => None,
        }
    }

    fn occupancy(&self) -> Occupancy {
        Occupancy {
            waiting: self.waiting,
            couch: self.couch,
            chairs: self.chairs.len(),
            cashier_free: self.cashier_free,
            pending: self.pending,
        }
    }
}

pub struct ShopMonitor {
    state: Mutex<ShopState>,
    customer_arrived: Condvar,
    capacity_freed: Condvar,
    payment_completed: Condvar,
    cashier_released: Condvar,
    chair_capacity: usize,
    couch_capacity: usize,
    room_capacity: usize,
    sink: Arc<dyn EventSink>,
}

impl ShopMonitor {
    pub fn new(config: &ShopConfig, sink: Arc<dyn EventSink>) -> Self {
        ShopMonitor {
            state: Mutex::new(ShopState {
                waiting: 0,
                couch: 0,
                chairs: HashMap::new(),
                cashier_free: true,
                pending: config.total_customers,
                abandoned: false,
            }),
            customer_arrived: Condvar::new(),
            capacity_freed: Condvar::new(),
            payment_completed: Condvar::new(),
            cashier_released: Condvar::new(),
            chair_capacity: config.chair_capacity,
            couch_capacity: config.couch_capacity,
            room_capacity: config.room_capacity,
            sink,
        }
    }

    /// Decide si el cliente entra. Nunca bloquea: si el local está lleno el
    /// cliente se va y queda resuelto.
    pub fn enter(&self, customer: CustomerId) -> Result<Admission, BarberShopError> {
        let mut state = self.state.lock()?;
        if state.inside() >= self.room_capacity {
            self.resolve_customer(&mut state, ShopEvent::Rejected { customer });
            return Ok(Admission::Rejected);
        }
        state.waiting += 1;
        self.emit(&state, ShopEvent::Admitted { customer });
        Ok(Admission::Admitted)
    }

    // Un cliente que espera en el sofá o en una silla sigue pendiente, así que
    // mientras espera el contador global no puede llegar a cero.
    pub fn sit_on_couch(&self, customer: CustomerId) -> Result<(), BarberShopError> {
        let mut state = self
            .capacity_freed
            .wait_while(self.state.lock()?, |state| {
                !state.abandoned && state.couch >= self.couch_capacity
            })?;
        state.check_abandoned()?;
        state.waiting -= 1;
        state.couch += 1;
        self.emit(&state, ShopEvent::SeatedOnCouch { customer });
        Ok(())
    }

    pub fn sit_in_chair(&self, customer: CustomerId) -> Result<(), BarberShopError> {
        let mut state = self
            .capacity_freed
            .wait_while(self.state.lock()?, |state| {
                !state.abandoned && state.chairs.len() >= self.chair_capacity
            })?;
        state.check_abandoned()?;
        state.couch -= 1;
        state.chairs.insert(customer, ChairStage::AwaitingBarber);
        self.emit(&state, ShopEvent::SeatedInChair { customer });

        // quedó un lugar libre en el sofá
        self.capacity_freed.notify_all();
        self.customer_arrived.notify_one();
        Ok(())
    }

    /// Lado del barbero: duerme hasta que haya un cliente sin atender en una
    /// silla y lo toma. Devuelve `None` cuando ya no quedan clientes
    /// pendientes y el barbero debe retirarse.
    pub fn wait_for_customer(
        &self,
        barber: BarberId,
    ) -> Result<Option<CustomerId>, BarberShopError> {
        let mut state = self.state.lock()?;
        let mut asleep = false;
        let customer = loop {
            state.check_abandoned()?;
            if state.closed() {
                return Ok(None);
            }
            if let Some(customer) = state.next_unclaimed() {
                break customer;
            }
            if !asleep {
                self.emit(&state, ShopEvent::BarberAsleep { barber });
                asleep = true;
            }
            state = self.customer_arrived.wait(state)?;
        };
        state
            .chairs
            .insert(customer, ChairStage::InService(barber));
        self.emit(&state, ShopEvent::ServiceStarted { barber, customer });
        Ok(Some(customer))
    }

    /// Lado del barbero, con el corte ya terminado: avisa que se puede pagar
    /// y espera hasta que su cliente tome la caja.
    pub fn collect_payment(
        &self,
        barber: BarberId,
        customer: CustomerId,
    ) -> Result<(), BarberShopError> {
        let mut state = self.state.lock()?;
        state.check_abandoned()?;
        if let Some(stage) = state.chairs.get_mut(&customer) {
            *stage = ChairStage::ReadyToPay(barber);
        }
        self.emit(&state, ShopEvent::ServiceFinished { barber, customer });

        while !state.closed() && state.stage(customer) == Some(ChairStage::ReadyToPay(barber)) {
            self.cashier_released.notify_all();
            state = self.payment_completed.wait(state)?;
            state.check_abandoned()?;
        }
        Ok(())
    }

    /// Lado del cliente: espera a que su barbero le pida el pago y a que la
    /// caja esté libre, y la ocupa. Devuelve el barbero al que le pagó.
    pub fn pay(&self, customer: CustomerId) -> Result<BarberId, BarberShopError> {
        let mut state = self.state.lock()?;
        let barber = loop {
            state.check_abandoned()?;
            if let Some(barber) = state.payable_to(customer) {
                break barber;
            }
            state = self.cashier_released.wait(state)?;
        };
        state.cashier_free = false;
        state.chairs.insert(customer, ChairStage::Paying(barber));
        self.emit(&state, ShopEvent::PaymentRequested { customer, barber });

        // varios barberos pueden estar esperando un pago: cada uno mira el suyo
        self.payment_completed.notify_all();
        Ok(barber)
    }

    /// Libera la caja y la silla; el cliente queda resuelto.
    pub fn leave(&self, customer: CustomerId, barber: BarberId) -> Result<(), BarberShopError> {
        let mut state = self.state.lock()?;
        state.cashier_free = true;
        state.chairs.remove(&customer);
        self.emit(&state, ShopEvent::PaymentCompleted { customer, barber });
        self.resolve_customer(&mut state, ShopEvent::Departed { customer });

        self.cashier_released.notify_all();
        self.capacity_freed.notify_all();
        Ok(())
    }

    /// Despierta a todos para que revisen si la jornada terminó. Lo usa el
    /// que orquesta la corrida una vez que se fueron todos los clientes.
    pub fn wake_everyone(&self) {
        let _state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.broadcast_all();
    }

    /// Marca la corrida como abandonada y despierta a todos: cada uno que
    /// estaba esperando vuelve con `ShopAbandoned` (o `PoisonedLock` si el
    /// lock quedó envenenado) en lugar de esperar para siempre.
    pub fn abandon(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.abandoned = true;
        self.broadcast_all();
    }

    pub fn retire(&self, barber: BarberId) -> Result<(), BarberShopError> {
        let state = self.state.lock()?;
        self.emit(&state, ShopEvent::BarberRetired { barber });
        Ok(())
    }

    pub fn occupancy(&self) -> Result<Occupancy, BarberShopError> {
        Ok(self.state.lock()?.occupancy())
    }

    pub fn chair_stage(&self, customer: CustomerId) -> Result<Option<ChairStage>, BarberShopError> {
        Ok(self.state.lock()?.stage(customer))
    }

    // En la práctica solo una salida lleva el contador a cero: un rechazo
    // implica el local lleno, o sea algún admitido todavía pendiente.
    fn resolve_customer(&self, state: &mut ShopState, event: ShopEvent) {
        state.pending = state.pending.saturating_sub(1);
        self.emit(state, event);
        if state.closed() {
            self.broadcast_all();
        }
    }

    fn broadcast_all(&self) {
        self.customer_arrived.notify_all();
        self.payment_completed.notify_all();
        self.cashier_released.notify_all();
        self.capacity_freed.notify_all();
    }

    fn emit(&self, state: &ShopState, event: ShopEvent) {
        debug_assert!(state.inside() <= self.room_capacity);
        debug_assert!(state.couch <= self.couch_capacity);
        debug_assert!(state.chairs.len() <= self.chair_capacity);
        self.sink.record(event, state.occupancy());
    }
}

/// Se crea al principio de cada hilo de cliente o barbero. Si el hilo entra
/// en pánico, al desarmarse abandona la barbería para que nadie quede
/// esperando a alguien que ya no existe.
pub struct AbandonOnPanic {
    shop: Arc<ShopMonitor>,
}

impl AbandonOnPanic {
    pub fn new(shop: Arc<ShopMonitor>) -> Self {
        AbandonOnPanic { shop }
    }
}

impl Drop for AbandonOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.shop.abandon();
        }
    }
}
