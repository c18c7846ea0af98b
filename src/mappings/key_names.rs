use evdev::KeyCode;

/// Префикс вендорских клавиш X11 (`XF86AudioRaiseVolume` и т.п.)
const VENDOR_PREFIX: &str = "XF86";

/// Имена клавиш в нижнем регистре, отсортированы побайтово для бинарного поиска.
/// Имена соответствуют именам keysym, которые GNOME использует в сочетаниях.
static KEY_NAMES: &[(&str, KeyCode)] = &[
    ("0",                  KeyCode::KEY_0),
    ("1",                  KeyCode::KEY_1),
    ("2",                  KeyCode::KEY_2),
    ("3",                  KeyCode::KEY_3),
    ("4",                  KeyCode::KEY_4),
    ("5",                  KeyCode::KEY_5),
    ("6",                  KeyCode::KEY_6),
    ("7",                  KeyCode::KEY_7),
    ("8",                  KeyCode::KEY_8),
    ("9",                  KeyCode::KEY_9),
    ("a",                  KeyCode::KEY_A),
    ("alt",                KeyCode::KEY_LEFTALT),
    ("alt_l",              KeyCode::KEY_LEFTALT),
    ("alt_r",              KeyCode::KEY_RIGHTALT),
    ("apostrophe",         KeyCode::KEY_APOSTROPHE),
    ("audiolowervolume",   KeyCode::KEY_VOLUMEDOWN),
    ("audiomicmute",       KeyCode::KEY_MICMUTE),
    ("audiomute",          KeyCode::KEY_MUTE),
    ("audionext",          KeyCode::KEY_NEXTSONG),
    ("audiopause",         KeyCode::KEY_PAUSECD),
    ("audioplay",          KeyCode::KEY_PLAYPAUSE),
    ("audioprev",          KeyCode::KEY_PREVIOUSSONG),
    ("audioraisevolume",   KeyCode::KEY_VOLUMEUP),
    ("audiostop",          KeyCode::KEY_STOPCD),
    ("b",                  KeyCode::KEY_B),
    ("back",               KeyCode::KEY_BACK),
    ("backslash",          KeyCode::KEY_BACKSLASH),
    ("backspace",          KeyCode::KEY_BACKSPACE),
    ("battery",            KeyCode::KEY_BATTERY),
    ("bluetooth",          KeyCode::KEY_BLUETOOTH),
    ("bracketleft",        KeyCode::KEY_LEFTBRACE),
    ("bracketright",       KeyCode::KEY_RIGHTBRACE),
    ("c",                  KeyCode::KEY_C),
    ("calculator",         KeyCode::KEY_CALC),
    ("caps_lock",          KeyCode::KEY_CAPSLOCK),
    ("comma",              KeyCode::KEY_COMMA),
    ("control",            KeyCode::KEY_LEFTCTRL),
    ("control_l",          KeyCode::KEY_LEFTCTRL),
    ("control_r",          KeyCode::KEY_RIGHTCTRL),
    ("ctrl",               KeyCode::KEY_LEFTCTRL),
    ("d",                  KeyCode::KEY_D),
    ("delete",             KeyCode::KEY_DELETE),
    ("display",            KeyCode::KEY_SWITCHVIDEOMODE),
    ("down",               KeyCode::KEY_DOWN),
    ("e",                  KeyCode::KEY_E),
    ("eject",              KeyCode::KEY_EJECTCD),
    ("end",                KeyCode::KEY_END),
    ("equal",              KeyCode::KEY_EQUAL),
    ("escape",             KeyCode::KEY_ESC),
    ("f",                  KeyCode::KEY_F),
    ("f1",                 KeyCode::KEY_F1),
    ("f10",                KeyCode::KEY_F10),
    ("f11",                KeyCode::KEY_F11),
    ("f12",                KeyCode::KEY_F12),
    ("f13",                KeyCode::KEY_F13),
    ("f14",                KeyCode::KEY_F14),
    ("f15",                KeyCode::KEY_F15),
    ("f16",                KeyCode::KEY_F16),
    ("f17",                KeyCode::KEY_F17),
    ("f18",                KeyCode::KEY_F18),
    ("f19",                KeyCode::KEY_F19),
    ("f2",                 KeyCode::KEY_F2),
    ("f20",                KeyCode::KEY_F20),
    ("f21",                KeyCode::KEY_F21),
    ("f22",                KeyCode::KEY_F22),
    ("f23",                KeyCode::KEY_F23),
    ("f24",                KeyCode::KEY_F24),
    ("f3",                 KeyCode::KEY_F3),
    ("f4",                 KeyCode::KEY_F4),
    ("f5",                 KeyCode::KEY_F5),
    ("f6",                 KeyCode::KEY_F6),
    ("f7",                 KeyCode::KEY_F7),
    ("f8",                 KeyCode::KEY_F8),
    ("f9",                 KeyCode::KEY_F9),
    ("forward",            KeyCode::KEY_FORWARD),
    ("g",                  KeyCode::KEY_G),
    ("grave",              KeyCode::KEY_GRAVE),
    ("h",                  KeyCode::KEY_H),
    ("home",               KeyCode::KEY_HOME),
    ("homepage",           KeyCode::KEY_HOMEPAGE),
    ("i",                  KeyCode::KEY_I),
    ("insert",             KeyCode::KEY_INSERT),
    ("j",                  KeyCode::KEY_J),
    ("k",                  KeyCode::KEY_K),
    ("kbdbrightnessdown",  KeyCode::KEY_KBDILLUMDOWN),
    ("kbdbrightnessup",    KeyCode::KEY_KBDILLUMUP),
    ("kp_0",               KeyCode::KEY_KP0),
    ("kp_1",               KeyCode::KEY_KP1),
    ("kp_2",               KeyCode::KEY_KP2),
    ("kp_3",               KeyCode::KEY_KP3),
    ("kp_4",               KeyCode::KEY_KP4),
    ("kp_5",               KeyCode::KEY_KP5),
    ("kp_6",               KeyCode::KEY_KP6),
    ("kp_7",               KeyCode::KEY_KP7),
    ("kp_8",               KeyCode::KEY_KP8),
    ("kp_9",               KeyCode::KEY_KP9),
    ("kp_add",             KeyCode::KEY_KPPLUS),
    ("kp_decimal",         KeyCode::KEY_KPDOT),
    ("kp_divide",          KeyCode::KEY_KPSLASH),
    ("kp_enter",           KeyCode::KEY_KPENTER),
    ("kp_equal",           KeyCode::KEY_KPEQUAL),
    ("kp_multiply",        KeyCode::KEY_KPASTERISK),
    ("kp_subtract",        KeyCode::KEY_KPMINUS),
    ("l",                  KeyCode::KEY_L),
    ("left",               KeyCode::KEY_LEFT),
    ("m",                  KeyCode::KEY_M),
    ("mail",               KeyCode::KEY_MAIL),
    ("menu",               KeyCode::KEY_COMPOSE),
    ("meta",               KeyCode::KEY_LEFTMETA),
    ("meta_l",             KeyCode::KEY_LEFTMETA),
    ("meta_r",             KeyCode::KEY_RIGHTMETA),
    ("minus",              KeyCode::KEY_MINUS),
    ("monbrightnessdown",  KeyCode::KEY_BRIGHTNESSDOWN),
    ("monbrightnessup",    KeyCode::KEY_BRIGHTNESSUP),
    ("n",                  KeyCode::KEY_N),
    ("next",               KeyCode::KEY_PAGEDOWN),
    ("num_lock",           KeyCode::KEY_NUMLOCK),
    ("o",                  KeyCode::KEY_O),
    ("p",                  KeyCode::KEY_P),
    ("page_down",          KeyCode::KEY_PAGEDOWN),
    ("page_up",            KeyCode::KEY_PAGEUP),
    ("pause",              KeyCode::KEY_PAUSE),
    ("period",             KeyCode::KEY_DOT),
    ("poweroff",           KeyCode::KEY_POWER),
    ("primary",            KeyCode::KEY_LEFTCTRL),
    ("print",              KeyCode::KEY_SYSRQ),
    ("prior",              KeyCode::KEY_PAGEUP),
    ("q",                  KeyCode::KEY_Q),
    ("r",                  KeyCode::KEY_R),
    ("refresh",            KeyCode::KEY_REFRESH),
    ("return",             KeyCode::KEY_ENTER),
    ("right",              KeyCode::KEY_RIGHT),
    ("s",                  KeyCode::KEY_S),
    ("screensaver",        KeyCode::KEY_COFFEE),
    ("scroll_lock",        KeyCode::KEY_SCROLLLOCK),
    ("search",             KeyCode::KEY_SEARCH),
    ("semicolon",          KeyCode::KEY_SEMICOLON),
    ("shift",              KeyCode::KEY_LEFTSHIFT),
    ("shift_l",            KeyCode::KEY_LEFTSHIFT),
    ("shift_r",            KeyCode::KEY_RIGHTSHIFT),
    ("slash",              KeyCode::KEY_SLASH),
    ("sleep",              KeyCode::KEY_SLEEP),
    ("space",              KeyCode::KEY_SPACE),
    ("super",              KeyCode::KEY_LEFTMETA),
    ("super_l",            KeyCode::KEY_LEFTMETA),
    ("super_r",            KeyCode::KEY_RIGHTMETA),
    ("t",                  KeyCode::KEY_T),
    ("tab",                KeyCode::KEY_TAB),
    ("touchpadtoggle",     KeyCode::KEY_TOUCHPAD_TOGGLE),
    ("u",                  KeyCode::KEY_U),
    ("up",                 KeyCode::KEY_UP),
    ("v",                  KeyCode::KEY_V),
    ("w",                  KeyCode::KEY_W),
    ("wlan",               KeyCode::KEY_WLAN),
    ("www",                KeyCode::KEY_WWW),
    ("x",                  KeyCode::KEY_X),
    ("y",                  KeyCode::KEY_Y),
    ("z",                  KeyCode::KEY_Z),
];

/// Преобразование имён клавиш из сочетаний GNOME в evdev коды
pub struct KeyNameResolver;

impl KeyNameResolver {
    /// Найти evdev код по имени клавиши.
    ///
    /// Префикс `XF86` отбрасывается, регистр не учитывается.
    /// `None` означает неизвестную клавишу, такой код нельзя отдавать устройству.
    pub fn resolve(key_name: &str) -> Option<KeyCode> {
        let key_name = key_name.strip_prefix(VENDOR_PREFIX).unwrap_or(key_name);
        let normalized = key_name.to_lowercase();

        KEY_NAMES
            .binary_search_by(|(name, _)| (*name).cmp(normalized.as_str()))
            .ok()
            .map(|index| KEY_NAMES[index].1)
    }

    /// Является ли код модификатором
    pub fn is_modifier(key_code: KeyCode) -> bool {
        matches!(
            key_code,
            KeyCode::KEY_LEFTCTRL
                | KeyCode::KEY_RIGHTCTRL
                | KeyCode::KEY_LEFTALT
                | KeyCode::KEY_RIGHTALT
                | KeyCode::KEY_LEFTSHIFT
                | KeyCode::KEY_RIGHTSHIFT
                | KeyCode::KEY_LEFTMETA
                | KeyCode::KEY_RIGHTMETA
        )
    }
}
