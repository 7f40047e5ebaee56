
pub mod channel;
pub mod code;
pub mod config;
pub mod engine;
pub mod host;
pub mod io;
pub mod pause;
pub mod receiver;
pub mod sampler;
pub mod serial;
pub mod snapshot;
pub mod srq;
pub mod timebase;

pub mod utils;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BasebandErr {
    InvalidConfig(&'static str),
    InvalidCodeBook(&'static str),
    InvalidFrame(&'static str),
    Io(&'static str),
    Timeout(&'static str),
}
