use crate::error::Result;
use crate::events::WindowRecord;
use crate::services::keybindings::{Action, Keybindings};
use crate::services::virtual_device::VirtualKeyboard;
use crate::services::window_directory::WindowDirectory;
use crate::services::window_filter::WindowFilter;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Клавиатура и сочетания, используемые вместо прямых вызовов расширения
struct KeybindMode {
    keyboard: VirtualKeyboard,
    keybindings: Keybindings,
}

/// Что делать с найденными окнами
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub action: Action,
    /// Остановиться после первого успешно обработанного окна
    pub first: bool,
    /// Проверять результат действия повторным запросом списка
    pub verify: bool,
}

/// Владелец соединения с расширением и (необязательно) виртуальной клавиатуры
/// на время одного запуска
pub struct WindowManipulator {
    directory: Box<dyn WindowDirectory>,
    keybind: Option<KeybindMode>,
}

impl WindowManipulator {
    /// Соединение уже установлено, клавиатура не подключена
    pub fn new(directory: Box<dyn WindowDirectory>) -> Self {
        Self {
            directory,
            keybind: None,
        }
    }

    /// Дальше действия выполняются сочетаниями клавиш
    pub fn attach_keyboard(&mut self, keyboard: VirtualKeyboard, keybindings: Keybindings) {
        info!("Режим сочетаний клавиш включён");
        self.keybind = Some(KeybindMode {
            keyboard,
            keybindings,
        });
    }

    pub fn uses_keyboard(&self) -> bool {
        self.keybind.is_some()
    }

    pub async fn list(&self) -> Result<Vec<WindowRecord>> {
        self.directory.list().await
    }

    /// Один раунд: список окон, выбор целей, действие.
    ///
    /// Прямой режим вызывает Minimize/Close для каждого совпавшего окна в каждом
    /// раунде, так что окно, развернувшее себя обратно, сворачивается снова
    /// (для `first` останавливается на первом успехе). В режиме сочетаний за раунд
    /// воспроизводится не больше одного сочетания, так как оно действует на весь
    /// оконный менеджер: цель это окно с фокусом, иначе первое ещё не обработанное.
    /// Успешно обработанные окна добавляются в `handled` без повторов.
    /// Возвращает число успехов за раунд.
    pub async fn apply(
        &mut self,
        filter: &WindowFilter,
        options: &MatchOptions,
        handled: &mut Vec<u32>,
    ) -> Result<usize> {
        let windows = self.directory.list().await?;
        let targets: Vec<&WindowRecord> = filter.select(&windows).collect();

        debug!(
            "Окон в списке: {}, совпадений для {:?}: {}",
            windows.len(),
            filter,
            targets.len()
        );

        if self.keybind.is_some() {
            let candidate = targets
                .iter()
                .find(|window| window.focused)
                .or_else(|| targets.iter().find(|window| !handled.contains(&window.id)));
            let Some(target) = candidate else {
                return Ok(0);
            };

            self.replay_for(target, options.action).await?;
            if self.confirm(target, options).await? {
                remember(handled, target.id);
                return Ok(1);
            }
            return Ok(0);
        }

        let mut succeeded = 0;
        for target in targets {
            match options.action {
                Action::Minimize => self.directory.minimize(target).await?,
                Action::Close => self.directory.close_window(target).await?,
            }
            info!("{} {}", options.action, target);

            if self.confirm(target, options).await? {
                remember(handled, target.id);
                succeeded += 1;
                if options.first {
                    break;
                }
            }
        }

        Ok(succeeded)
    }

    /// Повторять раунды каждые `poll_interval`, пока не истечёт `timeout`
    /// (нулевой таймаут даёт ровно один раунд). С `first` останавливается на
    /// первом успехе. Возвращает идентификаторы в порядке первого успеха.
    pub async fn run_until(
        &mut self,
        filter: &WindowFilter,
        options: &MatchOptions,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Vec<u32>> {
        let deadline = Instant::now() + timeout;
        let mut handled = Vec::new();

        loop {
            let succeeded = self.apply(filter, options, &mut handled).await?;

            if options.first && succeeded > 0 {
                break;
            }
            if Instant::now() + poll_interval > deadline {
                break;
            }
            sleep(poll_interval).await;
        }

        if handled.is_empty() {
            warn!("Подходящих окон не найдено за {:?}", timeout);
        } else {
            info!("Обработано окон: {}", handled.len());
        }

        Ok(handled)
    }

    async fn replay_for(&mut self, target: &WindowRecord, action: Action) -> Result<()> {
        let Some(mode) = self.keybind.as_mut() else {
            return Ok(());
        };

        self.directory.activate(target).await?;
        let sequence = mode.keybindings.sequence(action);
        info!("{} {} сочетанием {}", action, target, sequence);
        mode.keyboard.replay(sequence).await
    }

    /// Без проверки любое выполненное действие считается успехом. С проверкой
    /// окно должно исчезнуть из списка (или для сворачивания потерять фокус).
    async fn confirm(&self, target: &WindowRecord, options: &MatchOptions) -> Result<bool> {
        if !options.verify {
            return Ok(true);
        }

        let windows = self.directory.list().await?;
        let confirmed = match windows.iter().find(|window| window.id == target.id) {
            None => true,
            Some(_) if options.action == Action::Close => false,
            Some(window) => !window.focused,
        };

        if !confirmed {
            warn!("{} не подтверждено для {}", options.action, target);
        }
        Ok(confirmed)
    }

    /// Освободить виртуальное устройство и закрыть соединение
    pub async fn close(self) -> Result<()> {
        if let Some(mode) = self.keybind {
            mode.keyboard.close();
        }
        self.directory.disconnect().await
    }
}

fn remember(handled: &mut Vec<u32>, id: u32) {
    if !handled.contains(&id) {
        handled.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeySequence;
    use crate::services::virtual_device::{Capabilities, KeySink};
    use evdev::{InputEvent, KeyCode};
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<String>>>;

    /// Каждый вызов List отдаёт следующий список, последний повторяется
    struct Scripted {
        rounds: Mutex<VecDeque<Vec<WindowRecord>>>,
        calls: Calls,
    }

    impl Scripted {
        fn new(rounds: Vec<Vec<WindowRecord>>, calls: Calls) -> Box<Self> {
            Box::new(Self {
                rounds: Mutex::new(rounds.into()),
                calls,
            })
        }
    }

    #[async_trait::async_trait]
    impl WindowDirectory for Scripted {
        async fn list(&self) -> Result<Vec<WindowRecord>> {
            self.calls.lock().unwrap().push("List".to_string());
            let mut rounds = self.rounds.lock().unwrap();
            if rounds.len() > 1 {
                Ok(rounds.pop_front().unwrap_or_default())
            } else {
                Ok(rounds.front().cloned().unwrap_or_default())
            }
        }

        async fn minimize(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Minimize {}", window.id));
            Ok(())
        }

        async fn activate(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Activate {}", window.id));
            Ok(())
        }

        async fn close_window(&self, window: &WindowRecord) -> Result<()> {
            self.calls.lock().unwrap().push(format!("Close {}", window.id));
            Ok(())
        }

        async fn disconnect(self: Box<Self>) -> Result<()> {
            self.calls.lock().unwrap().push("Disconnect".to_string());
            Ok(())
        }
    }

    struct Recorder(Calls);

    impl KeySink for Recorder {
        fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
            let mut calls = self.0.lock().unwrap();
            for event in events {
                calls.push(format!("Key {} {}", event.code(), event.value()));
            }
            calls.push("Sync".to_string());
            Ok(())
        }
    }

    fn steam_windows() -> Vec<WindowRecord> {
        vec![
            WindowRecord::new(1).with_class("Steam").with_pid(100),
            WindowRecord::new(2).with_class("firefox").with_pid(200),
            WindowRecord::new(3).with_class("Steam").with_pid(100),
        ]
    }

    fn keybindings() -> Keybindings {
        Keybindings {
            minimize: KeySequence::new(&[KeyCode::KEY_LEFTMETA], KeyCode::KEY_H),
            close: KeySequence::new(&[KeyCode::KEY_LEFTALT], KeyCode::KEY_F4),
        }
    }

    fn attach_recorder(manipulator: &mut WindowManipulator, calls: &Calls) {
        let keybindings = keybindings();
        let mut capabilities = Capabilities::default();
        capabilities.declare(&keybindings.minimize);
        capabilities.declare(&keybindings.close);
        let keyboard = VirtualKeyboard::with_sink(
            Box::new(Recorder(calls.clone())),
            capabilities,
            Duration::ZERO,
        );
        manipulator.attach_keyboard(keyboard, keybindings);
    }

    fn options(action: Action, first: bool, verify: bool) -> MatchOptions {
        MatchOptions {
            action,
            first,
            verify,
        }
    }

    fn count(calls: &Calls, prefix: &str) -> usize {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    #[tokio::test]
    async fn test_direct_minimize_every_target_after_listing() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));
        let filter = WindowFilter::Class("Steam".to_string());

        let handled = manipulator
            .run_until(
                &filter,
                &options(Action::Minimize, false, false),
                Duration::ZERO,
                Duration::from_millis(100),
            )
            .await
            .unwrap();
        manipulator.close().await.unwrap();

        assert_eq!(handled, vec![1, 3]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["List", "Minimize 1", "Minimize 3", "Disconnect"]
        );
    }

    #[tokio::test]
    async fn test_direct_close_first_only() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));
        let filter = WindowFilter::Pid(100);

        let handled = manipulator
            .run_until(
                &filter,
                &options(Action::Close, true, false),
                Duration::from_secs(5),
                Duration::from_millis(100),
            )
            .await
            .unwrap();

        assert_eq!(handled, vec![1]);
        assert_eq!(*calls.lock().unwrap(), vec!["List", "Close 1"]);
    }

    #[tokio::test]
    async fn test_direct_mode_repeats_for_windows_still_listed() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));
        let filter = WindowFilter::Pid(200);
        let options = options(Action::Minimize, false, false);

        let mut handled = Vec::new();
        for _ in 0..3 {
            let succeeded = manipulator.apply(&filter, &options, &mut handled).await.unwrap();
            assert_eq!(succeeded, 1);
        }

        assert_eq!(handled, vec![2]);
        assert_eq!(count(&calls, "List"), 3);
        assert_eq!(count(&calls, "Minimize 2"), 3);
    }

    #[tokio::test]
    async fn test_polling_reapplies_until_timeout() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));

        let handled = manipulator
            .run_until(
                &WindowFilter::Pid(200),
                &options(Action::Minimize, false, false),
                Duration::from_millis(30),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        assert_eq!(handled, vec![2]);
        let lists = count(&calls, "List");
        assert!(lists >= 2);
        assert_eq!(count(&calls, "Minimize 2"), lists);
    }

    #[tokio::test]
    async fn test_keybind_mode_activates_then_replays_once() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));
        attach_recorder(&mut manipulator, &calls);
        assert!(manipulator.uses_keyboard());

        let mut handled = Vec::new();
        let succeeded = manipulator
            .apply(
                &WindowFilter::Class("Steam".to_string()),
                &options(Action::Close, false, false),
                &mut handled,
            )
            .await
            .unwrap();

        assert_eq!(succeeded, 1);
        assert_eq!(handled, vec![1]);

        let alt = KeyCode::KEY_LEFTALT.code();
        let f4 = KeyCode::KEY_F4.code();
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "List".to_string(),
                "Activate 1".to_string(),
                format!("Key {} 1", alt),
                format!("Key {} 1", f4),
                "Sync".to_string(),
                format!("Key {} 0", f4),
                format!("Key {} 0", alt),
                "Sync".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_keybind_mode_moves_on_to_unhandled_windows() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));
        attach_recorder(&mut manipulator, &calls);
        let filter = WindowFilter::Class("Steam".to_string());
        let options = options(Action::Minimize, false, false);

        let mut handled = Vec::new();
        manipulator.apply(&filter, &options, &mut handled).await.unwrap();
        manipulator.apply(&filter, &options, &mut handled).await.unwrap();
        let third = manipulator.apply(&filter, &options, &mut handled).await.unwrap();

        assert_eq!(handled, vec![1, 3]);
        assert_eq!(third, 0);

        let activations: Vec<String> = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with("Activate"))
            .cloned()
            .collect();
        assert_eq!(activations, vec!["Activate 1", "Activate 3"]);
    }

    #[tokio::test]
    async fn test_keybind_mode_replays_again_for_refocused_window() {
        let calls = Calls::default();
        let restored = vec![
            vec![WindowRecord::new(4).with_class("Steam")],
            vec![WindowRecord::new(4).with_class("Steam").with_focus(true)],
            vec![WindowRecord::new(4).with_class("Steam")],
        ];
        let mut manipulator = WindowManipulator::new(Scripted::new(restored, calls.clone()));
        attach_recorder(&mut manipulator, &calls);
        let filter = WindowFilter::Class("Steam".to_string());
        let options = options(Action::Minimize, false, false);

        let mut handled = Vec::new();
        let rounds = [
            manipulator.apply(&filter, &options, &mut handled).await.unwrap(),
            manipulator.apply(&filter, &options, &mut handled).await.unwrap(),
            manipulator.apply(&filter, &options, &mut handled).await.unwrap(),
        ];

        assert_eq!(rounds, [1, 1, 0]);
        assert_eq!(handled, vec![4]);
        assert_eq!(count(&calls, "Activate 4"), 2);
        assert_eq!(count(&calls, "Sync"), 4);
    }

    #[tokio::test]
    async fn test_verify_skips_window_that_kept_focus() {
        let calls = Calls::default();
        let focused = |id| WindowRecord::new(id).with_class("Steam").with_focus(true);
        let rounds = vec![
            vec![focused(1), focused(2)],
            vec![focused(1), focused(2)],
            vec![focused(1), WindowRecord::new(2).with_class("Steam")],
        ];
        let mut manipulator = WindowManipulator::new(Scripted::new(rounds, calls.clone()));
        let filter = WindowFilter::Class("Steam".to_string());

        let handled = manipulator
            .run_until(
                &filter,
                &options(Action::Minimize, true, true),
                Duration::ZERO,
                Duration::from_millis(100),
            )
            .await
            .unwrap();

        assert_eq!(handled, vec![2]);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["List", "Minimize 1", "List", "Minimize 2", "List"]
        );
    }

    #[tokio::test]
    async fn test_verify_close_requires_window_to_disappear() {
        let calls = Calls::default();
        let rounds = vec![
            steam_windows(),
            steam_windows(),
            vec![WindowRecord::new(2).with_class("firefox")],
        ];
        let mut manipulator = WindowManipulator::new(Scripted::new(rounds, calls.clone()));
        let options = options(Action::Close, false, true);

        let mut handled = Vec::new();
        let succeeded = manipulator
            .apply(&WindowFilter::Class("Steam".to_string()), &options, &mut handled)
            .await
            .unwrap();

        assert_eq!(succeeded, 1);
        assert_eq!(handled, vec![3]);
    }

    #[tokio::test]
    async fn test_polling_picks_up_late_window() {
        let calls = Calls::default();
        let late = vec![
            Vec::new(),
            vec![WindowRecord::new(5).with_class_instance("steam")],
        ];
        let mut manipulator = WindowManipulator::new(Scripted::new(late, calls.clone()));
        let filter = WindowFilter::ClassInstance("steam".to_string());

        let handled = manipulator
            .run_until(
                &filter,
                &options(Action::Minimize, true, false),
                Duration::from_secs(5),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        assert_eq!(handled, vec![5]);
        assert_eq!(*calls.lock().unwrap(), vec!["List", "List", "Minimize 5"]);
    }

    #[tokio::test]
    async fn test_no_match_returns_empty_after_timeout() {
        let calls = Calls::default();
        let mut manipulator = WindowManipulator::new(Scripted::new(vec![steam_windows()], calls.clone()));

        let handled = manipulator
            .run_until(
                &WindowFilter::Class("nothing".to_string()),
                &options(Action::Minimize, false, false),
                Duration::from_millis(30),
                Duration::from_millis(10),
            )
            .await
            .unwrap();

        assert!(handled.is_empty());
        let calls = calls.lock().unwrap();
        assert!(calls.len() >= 2);
        assert!(calls.iter().all(|call| call == "List"));
    }
}
