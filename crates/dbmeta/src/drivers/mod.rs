//! Engine drivers implementing [`crate::core::Connection`] and
//! [`crate::core::CatalogReader`].

#[cfg(feature = "firebird")]
pub mod firebird;
