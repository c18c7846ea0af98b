use crate::error::{MinimzdError, Result};
use crate::events::{KeySequence, KeyStroke};
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, BusType, InputEvent, InputId, KeyCode};
use std::collections::BTreeSet;
use std::io;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

pub const DEVICE_NAME: &str = "minimzd uinput";
pub const VENDOR_ID: u16 = 0x5676; // "Xv"
pub const PRODUCT_ID: u16 = 0x6D64; // "md"

/// Приёмник событий клавиатуры. Каждая пачка завершается SYN_REPORT.
pub trait KeySink: Send {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()>;
}

impl KeySink for VirtualDevice {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        VirtualDevice::emit(self, events)
    }
}

struct DryRunSink;

impl KeySink for DryRunSink {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        for event in events {
            info!("[DRY RUN] Клавиша {} -> {}", event.code(), event.value());
        }
        info!("[DRY RUN] SYN_REPORT");
        Ok(())
    }
}

/// Набор клавиш, объявленных устройству до активации
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    keys: BTreeSet<u16>,
}

impl Capabilities {
    pub fn declare(&mut self, sequence: &KeySequence) {
        self.keys.extend(sequence.keys().iter().map(|key| key.code()));
    }

    pub fn contains(&self, sequence: &KeySequence) -> bool {
        sequence.keys().iter().all(|key| self.keys.contains(&key.code()))
    }

    pub fn codes(&self) -> Vec<u16> {
        self.keys.iter().copied().collect()
    }

    fn to_attribute_set(&self) -> AttributeSet<KeyCode> {
        let mut set = AttributeSet::<KeyCode>::new();
        for code in &self.keys {
            set.insert(KeyCode::new(*code));
        }
        set
    }
}

/// Открытый, но ещё не активированный uinput: собирает объявления клавиш
pub struct PendingKeyboard {
    builder: Option<VirtualDeviceBuilder<'static>>,
    capabilities: Capabilities,
    settle_delay: Duration,
}

impl PendingKeyboard {
    /// Объявить все клавиши сочетания. Вызывается для каждого сочетания до `activate`.
    pub fn declare(&mut self, sequence: &KeySequence) {
        debug!("Объявление клавиш {} для виртуального устройства", sequence);
        self.capabilities.declare(sequence);
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Задать идентификатор устройства и создать узел в ядре
    pub fn activate(self) -> Result<VirtualKeyboard> {
        let Some(builder) = self.builder else {
            info!("[DRY RUN] Виртуальное устройство '{}' не создаётся", DEVICE_NAME);
            return Ok(VirtualKeyboard::with_sink(
                Box::new(DryRunSink),
                self.capabilities,
                self.settle_delay,
            ));
        };

        let keys = self.capabilities.to_attribute_set();
        let device = builder
            .name(DEVICE_NAME)
            .input_id(InputId::new(BusType::BUS_USB, VENDOR_ID, PRODUCT_ID, 1))
            .with_keys(&keys)
            .map_err(|e| MinimzdError::device("declare", e))?
            .build()
            .map_err(|e| MinimzdError::device("activate", e))?;

        info!(
            "Виртуальное устройство '{}' создано ({} клавиш)",
            DEVICE_NAME,
            self.capabilities.codes().len()
        );
        Ok(VirtualKeyboard::with_sink(
            Box::new(device),
            self.capabilities,
            self.settle_delay,
        ))
    }
}

/// Активированная виртуальная клавиатура для воспроизведения сочетаний
pub struct VirtualKeyboard {
    sink: Box<dyn KeySink>,
    capabilities: Capabilities,
    settle_delay: Duration,
}

impl VirtualKeyboard {
    /// Открыть /dev/uinput. В режиме dry run устройство не открывается.
    pub fn open(settle_delay: Duration, dry_run: bool) -> Result<PendingKeyboard> {
        info!("Инициализация виртуальной клавиатуры (dry_run: {})", dry_run);

        let builder = if dry_run {
            None
        } else {
            Some(VirtualDevice::builder().map_err(|e| MinimzdError::device("open", e))?)
        };

        Ok(PendingKeyboard {
            builder,
            capabilities: Capabilities::default(),
            settle_delay,
        })
    }

    pub(crate) fn with_sink(
        sink: Box<dyn KeySink>,
        capabilities: Capabilities,
        settle_delay: Duration,
    ) -> Self {
        Self {
            sink,
            capabilities,
            settle_delay,
        }
    }

    /// Нажать все клавиши по порядку, SYN, отпустить в обратном порядке, SYN.
    /// До и после ждём `settle_delay`, чтобы оконный менеджер успел увидеть устройство
    /// и обработать сочетание.
    pub async fn replay(&mut self, sequence: &KeySequence) -> Result<()> {
        if !self.capabilities.contains(sequence) {
            return Err(MinimzdError::device(
                "replay",
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("клавиши {} не объявлены до активации", sequence),
                ),
            ));
        }

        sleep(self.settle_delay).await;

        let presses: Vec<InputEvent> = sequence
            .presses()
            .into_iter()
            .map(KeyStroke::to_input_event)
            .collect();
        self.sink
            .emit(&presses)
            .map_err(|e| MinimzdError::device("press", e))?;

        let releases: Vec<InputEvent> = sequence
            .releases()
            .into_iter()
            .map(KeyStroke::to_input_event)
            .collect();
        self.sink
            .emit(&releases)
            .map_err(|e| MinimzdError::device("release", e))?;

        debug!("Сочетание {} воспроизведено", sequence);
        sleep(self.settle_delay).await;
        Ok(())
    }

    /// Уничтожить устройство. Узел удаляется ядром при закрытии дескриптора.
    pub fn close(self) {
        info!("Закрытие виртуального устройства");
        drop(self.sink);
    }
}
