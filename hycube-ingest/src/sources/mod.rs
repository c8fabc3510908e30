pub mod hycube;

pub use hycube::HycubeSource;
