mod server;

pub use server::OverlayServer;
