use crate::error::{MinimzdError, Result};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Запущенная пользователем команда, окна которой нужно свернуть
pub struct LaunchedCommand {
    program: String,
    child: Child,
}

impl LaunchedCommand {
    /// Командная строка делится по пробелам: первое слово программа, остальное аргументы.
    /// Пустая строка означает, что запускать нечего. Фоновая команда пишет stdout
    /// и stderr в /dev/null.
    pub fn spawn(command_line: &str, background: bool) -> Result<Option<Self>> {
        let mut words = command_line.split_whitespace();
        let Some(program) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let mut command = Command::new(program);
        command.args(&args);
        if background {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = command
            .spawn()
            .map_err(|e| MinimzdError::Launch(format!("{}: {}", program, e)))?;

        info!("Запущена команда '{}' (pid {:?})", command_line.trim(), child.id());
        Ok(Some(Self {
            program: program.to_string(),
            child,
        }))
    }

    pub fn pid(&self) -> Option<i32> {
        self.child.id().and_then(|pid| i32::try_from(pid).ok())
    }

    /// Дождаться завершения и вернуть код выхода. Завершение сигналом даёт 1.
    pub async fn wait(mut self) -> Result<i32> {
        debug!("Ожидание завершения '{}'", self.program);
        let status = self.child.wait().await?;

        match status.code() {
            Some(code) => {
                info!("'{}' завершилась с кодом {}", self.program, code);
                Ok(code)
            }
            None => {
                warn!("'{}' завершена сигналом", self.program);
                Ok(1)
            }
        }
    }
}
