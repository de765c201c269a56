//! QR App - генератор и читатель QR-кодов для командной строки
//!
//! Форма из настольной утилиты (текст, версия, уровень коррекции,
//! генерация, сохранение, чтение) в виде подкоманд и построчной оболочки.

pub mod config;
pub mod state;

pub use config::AppConfig;
pub use state::{describe_decoded, describe_symbol, execute, run_shell, FormError, FormState, ShellCommand};
