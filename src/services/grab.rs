use super::window_system::{GrabResponse, WindowSystem};
use crate::config::GrabConfig;
use crate::debug_if_enabled;
use crate::error::{LeapError, Result};
use std::time::Duration;
use tracing::{error, info};

/// Захват клавиатуры; отпускается при выходе из области видимости.
pub struct KeyboardGrab<'a> {
    window_system: &'a dyn WindowSystem,
}

impl Drop for KeyboardGrab<'_> {
    fn drop(&mut self) {
        info!("Освобождение клавиатуры");
        if let Err(e) = self.window_system.release_keyboard() {
            error!("Не удалось освободить клавиатуру: {}", e);
        }
    }
}

/// Пытается захватить клавиатуру, пока её держит другой клиент.
///
/// Паузы между попытками растут геометрически: initial, initial×m, initial×m², ...
/// После последней попытки пауза не делается.
pub async fn acquire_keyboard<'a>(window_system: &'a dyn WindowSystem, config: &GrabConfig) -> Result<KeyboardGrab<'a>> {
    let mut delay = config.initial_delay();

    for attempt in 1..=config.max_attempts {
        match window_system.acquire_keyboard().await? {
            GrabResponse::Success => {
                info!("Клавиатура захвачена (попытка {})", attempt);
                return Ok(KeyboardGrab { window_system });
            }
            GrabResponse::AlreadyHeld if attempt < config.max_attempts => {
                debug_if_enabled!("Клавиатура занята, повтор через {:?}", delay);
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, config.backoff_multiplier);
            }
            GrabResponse::AlreadyHeld => break,
            GrabResponse::Failed(code) => return Err(LeapError::GrabFailed { code }),
        }
    }

    Err(LeapError::GrabContended {
        attempts: config.max_attempts,
    })
}

/// Верхняя граница паузы между попытками захвата
const MAX_RETRY_DELAY: Duration = Duration::from_secs(1);

fn next_delay(delay: Duration, multiplier: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * multiplier)
        .map(|next| next.min(MAX_RETRY_DELAY))
        .unwrap_or(MAX_RETRY_DELAY)
}
