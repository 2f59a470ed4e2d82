pub mod accessory;
pub mod luftdaten;
pub mod poller;
pub mod state;
