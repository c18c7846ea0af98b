use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Переменные окружения сессии пользователя, запустившего `sudo`.
///
/// /dev/uinput часто требует root, а настройки GNOME живут в сессии пользователя.
pub fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Some(uid) = lookup_uid(&sudo_user) {
                debug!("Подставляем переменные окружения для пользователя {}: uid={}", sudo_user, uid);
                env_vars.extend(session_vars(&sudo_user, &uid));
            }
        }
    }

    if let Ok(display_var) = std::env::var("DISPLAY") {
        env_vars.insert("DISPLAY".to_string(), display_var);
    }

    env_vars
}

/// Команда, выполняемая от имени `SUDO_USER`, если он есть
pub fn user_command(program: &str, args: &[&str]) -> Command {
    let mut cmd = if let Ok(sudo_user) = std::env::var("SUDO_USER") {
        let mut cmd = Command::new("sudo");
        cmd.args(["-E", "-u", &sudo_user, program]);
        cmd.args(args);
        cmd
    } else {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    };

    for (key, value) in build_env_overrides() {
        cmd.env(key, value);
    }

    cmd
}

fn lookup_uid(user: &str) -> Option<String> {
    let output = Command::new("id").args(["-u", user]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let uid = String::from_utf8(output.stdout).ok()?;
    Some(uid.trim().to_string())
}

fn session_vars(user: &str, uid: &str) -> [(String, String); 3] {
    let runtime_dir = format!("/run/user/{}", uid);
    [
        (
            "DBUS_SESSION_BUS_ADDRESS".to_string(),
            format!("unix:path={}/bus", runtime_dir),
        ),
        ("XDG_RUNTIME_DIR".to_string(), runtime_dir),
        ("USER".to_string(), user.to_string()),
    ]
}
