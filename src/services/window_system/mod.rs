//! Оконная система: список окон, активация и клавиатура.
//!
//! Только чтение свойств и отправка запросов. Никакой логики выбора окна здесь
//! нет: решения принимает `engine`, последовательность шагов задаёт `switcher`.

pub mod dry_run;
mod keymap;
mod r#trait;
mod x11;

pub use self::r#trait::{create_window_system, GrabResponse, WindowSystem};
