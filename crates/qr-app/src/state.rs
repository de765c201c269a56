//! Состояние формы генерации и построчная оболочка над ним
//!
//! Форма хранит текст, версию и уровень коррекции. Сохранение недоступно,
//! пока не был сгенерирован хотя бы один символ.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use qr_codec::{
    to_terminal_string, DecodedQR, ErrorCorrectionLevel, ParseError, QRError, QRToolkit, Symbol,
    Version,
};
use thiserror::Error;

/// Ошибки формы и оболочки
#[derive(Error, Debug)]
pub enum FormError {
    #[error("Nothing to save: generate a QR code first")]
    NothingGenerated,

    #[error("Unknown command: {0:?} (type `help`)")]
    UnknownCommand(String),

    #[error("Missing argument for `{0}`")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codec(#[from] QRError),
}

/// Поля формы и последний сгенерированный символ
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub text: String,
    pub version: Version,
    pub ec_level: ErrorCorrectionLevel,
    last_symbol: Option<Symbol>,
}

impl FormState {
    pub fn new(version: Version, ec_level: ErrorCorrectionLevel) -> Self {
        Self {
            text: String::new(),
            version,
            ec_level,
            last_symbol: None,
        }
    }

    /// Кнопка сохранения активна только после генерации
    pub fn can_save(&self) -> bool {
        self.last_symbol.is_some()
    }

    pub fn last_symbol(&self) -> Option<&Symbol> {
        self.last_symbol.as_ref()
    }

    /// Генерация по текущим полям; при ошибке прежний символ остаётся
    pub fn generate(&mut self, toolkit: &QRToolkit) -> Result<&Symbol, FormError> {
        let symbol = toolkit.generate(&self.text, self.version, self.ec_level)?;
        Ok(self.last_symbol.insert(symbol))
    }

    pub fn save(&self, toolkit: &QRToolkit, path: &Path) -> Result<(), FormError> {
        let symbol = self.last_symbol.as_ref().ok_or(FormError::NothingGenerated)?;
        toolkit.save(symbol, path)?;
        Ok(())
    }
}

/// Команда оболочки
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Text(String),
    Version(Version),
    Ec(ErrorCorrectionLevel),
    Generate,
    Save(PathBuf),
    Read(PathBuf),
    Show,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = FormError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &'static str| {
            if rest.is_empty() {
                Err(FormError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        match name.to_ascii_lowercase().as_str() {
            // Текст может быть пустым, как пустое поле ввода
            "text" => Ok(Self::Text(rest.to_string())),
            "version" => Ok(Self::Version(arg("version")?.parse()?)),
            "ec" => Ok(Self::Ec(arg("ec")?.parse()?)),
            "generate" | "gen" => Ok(Self::Generate),
            "save" => Ok(Self::Save(PathBuf::from(arg("save")?))),
            "read" => Ok(Self::Read(PathBuf::from(arg("read")?))),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(FormError::UnknownCommand(line.to_string())),
        }
    }
}

const HELP: &str = "\
Commands:
  text <TEXT>      set the text to encode
  version <1-40>   select the QR version
  ec <L|M|Q|H>     select the error correction level
  generate         build the QR code from the form
  save <FILE>      save the last QR code as PNG
  read <IMAGE>     decode QR codes from an image file
  show             print the form and the last QR code
  quit             leave the shell";

/// Строки результата чтения в формате формы
pub fn describe_decoded(decoded: &[DecodedQR]) -> Vec<String> {
    if decoded.is_empty() {
        return vec!["No QR code found.".to_string()];
    }
    decoded
        .iter()
        .map(|qr| format!("Decoded Data: {}", qr.content))
        .collect()
}

/// Краткое описание символа
pub fn describe_symbol(symbol: &Symbol) -> String {
    format!(
        "QR version {}-{}, {}x{} modules, mask {}, {} mode",
        symbol.version(),
        symbol.ec_level(),
        symbol.size(),
        symbol.size(),
        symbol.mask(),
        symbol.mode()
    )
}

/// Выполнение одной команды; `Ok(false)` означает выход
pub fn execute(
    state: &mut FormState,
    toolkit: &QRToolkit,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<bool, FormError> {
    match command {
        ShellCommand::Text(text) => state.text = text,
        ShellCommand::Version(version) => state.version = version,
        ShellCommand::Ec(ec_level) => state.ec_level = ec_level,
        ShellCommand::Generate => {
            let symbol = state.generate(toolkit)?;
            write_line(out, &describe_symbol(symbol));
        }
        ShellCommand::Save(path) => {
            state.save(toolkit, &path)?;
            write_line(out, &format!("Saved to {}", path.display()));
        }
        ShellCommand::Read(path) => {
            let decoded = toolkit.read_file(&path)?;
            for line in describe_decoded(&decoded) {
                write_line(out, &line);
            }
        }
        ShellCommand::Show => {
            write_line(
                out,
                &format!(
                    "text: {:?}, version: {}, ec: {}, save: {}",
                    state.text,
                    state.version,
                    state.ec_level,
                    if state.can_save() { "enabled" } else { "disabled" }
                ),
            );
            if let Some(symbol) = state.last_symbol() {
                write_line(out, &describe_symbol(symbol));
                let quiet_zone = toolkit.renderer().config().quiet_zone as usize;
                write_line(out, to_terminal_string(symbol, quiet_zone).trim_end_matches('\n'));
            }
        }
        ShellCommand::Help => write_line(out, HELP),
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Цикл оболочки: ошибки команд печатаются, цикл продолжается
pub fn run_shell(
    state: &mut FormState,
    toolkit: &QRToolkit,
    input: impl BufRead,
    mut out: impl Write,
) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let result = line
                .parse::<ShellCommand>()
                .and_then(|command| execute(state, toolkit, command, &mut out));
            match result {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    log::debug!("Shell command failed: {:?}", e);
                    writeln!(out, "Error: {}", e)?;
                }
            }
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}

fn write_line(out: &mut impl Write, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        log::warn!("Failed to write shell output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "text hello world".parse::<ShellCommand>().unwrap(),
            ShellCommand::Text("hello world".to_string())
        );
        assert_eq!("text".parse::<ShellCommand>().unwrap(), ShellCommand::Text(String::new()));
        assert_eq!(
            "version 7".parse::<ShellCommand>().unwrap(),
            ShellCommand::Version(Version::new(7).unwrap())
        );
        assert_eq!("EC q".parse::<ShellCommand>().unwrap(), ShellCommand::Ec(ErrorCorrectionLevel::Q));
        assert_eq!("gen".parse::<ShellCommand>().unwrap(), ShellCommand::Generate);
        assert_eq!(
            "save out/qr.png".parse::<ShellCommand>().unwrap(),
            ShellCommand::Save(PathBuf::from("out/qr.png"))
        );
        assert_eq!("quit".parse::<ShellCommand>().unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "version 41".parse::<ShellCommand>(),
            Err(FormError::Parse(ParseError::InvalidVersion(_)))
        ));
        assert!(matches!(
            "ec X".parse::<ShellCommand>(),
            Err(FormError::Parse(ParseError::InvalidErrorCorrectionLevel(_)))
        ));
        assert!(matches!("save".parse::<ShellCommand>(), Err(FormError::MissingArgument("save"))));
        assert!(matches!("fly".parse::<ShellCommand>(), Err(FormError::UnknownCommand(_))));
    }

    #[test]
    fn test_save_disabled_until_generate() {
        let toolkit = QRToolkit::default();
        let mut state = FormState::default();
        assert!(!state.can_save());
        assert!(matches!(
            state.save(&toolkit, Path::new("unused.png")),
            Err(FormError::NothingGenerated)
        ));

        state.text = "HELLO".to_string();
        state.ec_level = ErrorCorrectionLevel::M;
        let symbol = state.generate(&toolkit).unwrap();
        assert_eq!(symbol.size(), 21);
        assert!(state.can_save());
    }

    #[test]
    fn test_failed_generate_keeps_previous_symbol() {
        let toolkit = QRToolkit::default();
        let mut state = FormState::new(Version::MIN, ErrorCorrectionLevel::H);
        state.text = "short".to_string();
        state.generate(&toolkit).unwrap();

        state.text = "far too long for version one at level H".to_string();
        assert!(matches!(state.generate(&toolkit), Err(FormError::Codec(_))));
        assert!(state.can_save());
        assert_eq!(state.last_symbol().map(|s| s.version()), Some(Version::MIN));
    }

    #[test]
    fn test_describe_decoded() {
        assert_eq!(describe_decoded(&[]), vec!["No QR code found.".to_string()]);
        let qr = DecodedQR {
            content: "hi".to_string(),
            error_correction: None,
            version: None,
        };
        assert_eq!(describe_decoded(&[qr]), vec!["Decoded Data: hi".to_string()]);
    }
}
