//! Parámetros de una corrida de la barbería.

use std::time::Duration;

use super::constants::*;
use super::error::BarberShopError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopConfig {
    pub chair_capacity: usize,
    pub barber_count: usize,
    pub couch_capacity: usize,
    pub room_capacity: usize,
    pub total_customers: usize,
    pub haircut_duration: Duration,
    pub arrival_interval: Duration,
    /// Demora aleatoria extra (entre cero y este valor) antes de cada llegada.
    pub arrival_jitter: Duration,
}

impl ShopConfig {
    pub fn new(total_customers: usize) -> Self {
        ShopConfig {
            chair_capacity: CHAIR_CAPACITY,
            barber_count: BARBER_COUNT,
            couch_capacity: COUCH_CAPACITY,
            room_capacity: ROOM_CAPACITY,
            total_customers,
            haircut_duration: HAIRCUT_DURATION,
            arrival_interval: ARRIVAL_INTERVAL,
            arrival_jitter: ARRIVAL_JITTER,
        }
    }

    pub fn with_chairs(mut self, chair_capacity: usize) -> Self {
        self.chair_capacity = chair_capacity;
        self
    }

    pub fn with_barbers(mut self, barber_count: usize) -> Self {
        self.barber_count = barber_count;
        self
    }

    pub fn with_couch(mut self, couch_capacity: usize) -> Self {
        self.couch_capacity = couch_capacity;
        self
    }

    pub fn with_room(mut self, room_capacity: usize) -> Self {
        self.room_capacity = room_capacity;
        self
    }

    pub fn with_haircut_duration(mut self, haircut_duration: Duration) -> Self {
        self.haircut_duration = haircut_duration;
        self
    }

    pub fn with_arrival_interval(mut self, arrival_interval: Duration) -> Self {
        self.arrival_interval = arrival_interval;
        self
    }

    pub fn with_arrival_jitter(mut self, arrival_jitter: Duration) -> Self {
        self.arrival_jitter = arrival_jitter;
        self
    }

    /// Rechaza cualquier cantidad nula: sin clientes, barberos o lugares la
    /// corrida no tiene sentido (o no termina nunca).
    pub fn validate(&self) -> Result<(), BarberShopError> {
        let checks = [
            (self.total_customers, "La cantidad de clientes debe ser un entero positivo"),
            (self.barber_count, "Tiene que haber al menos un barbero"),
            (self.chair_capacity, "Tiene que haber al menos una silla"),
            (self.couch_capacity, "En el sofá tiene que entrar al menos un cliente"),
            (self.room_capacity, "En el local tiene que entrar al menos un cliente"),
        ];
        for (value, message) in checks {
            if value == 0 {
                return Err(BarberShopError::InvalidConfig(String::from(message)));
            }
        }
        Ok(())
    }
}
