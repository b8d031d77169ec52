//! Interactive console prompts.
//!
//! Everything reads from a `BufRead` and writes to a `Write`, so the same code
//! drives a terminal in production and in-memory buffers in tests. Invalid
//! answers are re-asked; end of input is an error and ends the run.

use console::style;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use shared_utils::{IntentQuestion, IntentResolver, IntentScope, MediaKind, TargetFormat};

pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{} ", style(question).bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    fn invalid_selection(&mut self) -> io::Result<()> {
        self.say(style("Invalid Selection").red())
    }

    /// Ask until the operator names an existing file or folder.
    pub fn ask_input_path(&mut self) -> io::Result<PathBuf> {
        loop {
            let answer = self.ask("Enter target file or folder path:")?;
            if answer.is_empty() {
                self.say(style("Please enter a valid path").yellow())?;
                continue;
            }
            let path = PathBuf::from(answer);
            if !path.exists() {
                self.say(style("That path does not exist. Try again.").yellow())?;
                continue;
            }
            return Ok(path);
        }
    }

    /// `None` means "use the default folder".
    pub fn ask_output_folder(&mut self) -> io::Result<Option<PathBuf>> {
        let mut answer = self.ask("Enter output folder (press Enter for default):")?;
        loop {
            if answer.is_empty() {
                return Ok(None);
            }
            let path = PathBuf::from(&answer);
            if path.is_dir() {
                return Ok(Some(path));
            }
            answer = self.ask("Invalid folder. Re-enter path or press Enter to skip:")?;
        }
    }

    fn choose_video_direction(&mut self) -> io::Result<MediaKind> {
        loop {
            self.say("Video conversion options:")?;
            self.say("1) Video → Video")?;
            self.say("2) Video → Audio")?;
            match self.ask("Choose (1/2):")?.as_str() {
                "1" => return Ok(MediaKind::Video),
                "2" => return Ok(MediaKind::Audio),
                _ => self.invalid_selection()?,
            }
        }
    }

    fn choose_extension(&mut self, kind: MediaKind) -> io::Result<TargetFormat> {
        let question = format!(
            "Enter {} extension of output ({}):",
            kind,
            kind.extensions().join(", ")
        );
        loop {
            let answer = self.ask(&question)?;
            match TargetFormat::parse_for_kind(kind, &answer) {
                Ok(target) => return Ok(target),
                Err(_) => self.invalid_selection()?,
            }
        }
    }
}

impl<R: BufRead, W: Write> IntentResolver for ConsolePrompt<R, W> {
    fn resolve(&mut self, question: &IntentQuestion<'_>) -> io::Result<TargetFormat> {
        match question.scope {
            IntentScope::SingleFile(_) => {}
            IntentScope::HomogeneousFolder => self.say(format!(
                "\nAll {} {} files will be converted.",
                style(question.file_count).cyan(),
                question.kind
            ))?,
            IntentScope::MixedFolder => self.say(format!(
                "\n{} files found: {}",
                style(question.kind.as_str().to_uppercase()).cyan().bold(),
                question.file_count
            ))?,
        }

        let target_kind = match question.kind {
            MediaKind::Video => self.choose_video_direction()?,
            kind => kind,
        };
        self.choose_extension(target_kind)
    }
}
