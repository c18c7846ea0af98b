use crate::events::WindowRecord;
use std::fs;
use std::path::Path;

/// Длина имени процесса в /proc/<pid>/comm (TASK_COMM_LEN без завершающего нуля)
const COMM_LEN: usize = 15;

/// Критерий выбора окон. Активен ровно один вид сравнения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowFilter {
    Pid(i32),
    ProcessName(String),
    ClassInstance(String),
    Class(String),
}

impl WindowFilter {
    /// Сравнение строк точное и с учётом регистра
    pub fn matches(&self, window: &WindowRecord) -> bool {
        match self {
            WindowFilter::Pid(pid) => window.pid == *pid,
            WindowFilter::ProcessName(name) => {
                process_name(window.pid).is_some_and(|comm| comm == *name)
            }
            WindowFilter::ClassInstance(class_instance) => window.class_instance == *class_instance,
            WindowFilter::Class(class) => window.class_name == *class,
        }
    }

    /// Один проход по списку в исходном порядке
    pub fn select<'a>(
        &'a self,
        windows: &'a [WindowRecord],
    ) -> impl Iterator<Item = &'a WindowRecord> + 'a {
        windows.iter().filter(move |window| self.matches(window))
    }
}

/// Значения для сравнения, собранные из аргументов командной строки
#[derive(Debug, Clone, Default)]
pub struct MatchCriteria {
    pub pid: Option<i32>,
    pub match_process_name: bool,
    pub process_name: Option<String>,
    pub class_instance: Option<String>,
    pub class: Option<String>,
}

impl MatchCriteria {
    /// Незаданные имена берутся из первого слова запущенной команды, каждое независимо
    pub fn with_command_fallback(mut self, command: Option<&str>) -> Self {
        let Some(program) = command.and_then(|command| command.split_whitespace().next()) else {
            return self;
        };

        let executable = Path::new(program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(program);

        self.process_name = self.process_name.or_else(|| Some(executable.to_string()));
        self.class_instance = self.class_instance.or_else(|| Some(program.to_string()));
        self.class = self.class.or_else(|| Some(program.to_string()));
        self
    }

    /// Приоритет: pid, имя процесса (если запрошено), экземпляр класса, класс
    pub fn into_filter(self) -> Option<WindowFilter> {
        if let Some(pid) = self.pid.filter(|pid| *pid != 0) {
            return Some(WindowFilter::Pid(pid));
        }

        if self.match_process_name {
            if let Some(name) = non_empty(self.process_name) {
                return Some(WindowFilter::ProcessName(truncate_comm(&name)));
            }
        }

        if let Some(class_instance) = non_empty(self.class_instance) {
            return Some(WindowFilter::ClassInstance(class_instance));
        }

        non_empty(self.class).map(WindowFilter::Class)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn truncate_comm(name: &str) -> String {
    let mut end = name.len().min(COMM_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

fn process_name(pid: i32) -> Option<String> {
    if pid <= 0 {
        return None;
    }
    fs::read_to_string(format!("/proc/{}/comm", pid))
        .ok()
        .map(|comm| comm.trim_end().to_string())
}
