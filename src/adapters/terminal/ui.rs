//! Terminal front end.
//!
//! A deliberately thin driver: it draws render instructions, reads stdin,
//! and hands events back to the phase controller. Every decision (phase
//! changes, prompts, validation, persistence) lives behind the
//! controller, so this module stays I/O only.

use std::io;

use console::{style, Term};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{sleep, Duration};

use crate::domain::foundation::LikertResponse;
use crate::domain::session::{ExperimentArm, Message, RenderInstruction, SessionEvent};
use crate::domain::survey::form::{AgeBand, Education, Gender};
use crate::domain::survey::{SurveyField, SurveyForm};

/// Interactive terminal surface for one participant session.
pub struct TerminalUi {
    term: Term,
    lines: Lines<BufReader<Stdin>>,
    /// Form state, preserved across validation warnings.
    form: SurveyForm,
    /// Transcript entries already printed, to avoid re-printing.
    printed: usize,
}

impl TerminalUi {
    /// Creates a UI over stdout/stdin.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
            form: SurveyForm::new(),
            printed: 0,
        }
    }

    /// Draws the render instruction and waits for the next event.
    ///
    /// Returns `None` when the run is over (terminal success screen) or
    /// stdin is closed.
    pub async fn next_event(
        &mut self,
        render: &RenderInstruction,
    ) -> io::Result<Option<SessionEvent>> {
        match render {
            RenderInstruction::ModeChoice { prompt } => {
                self.term.write_line("")?;
                self.term.write_line(&style(prompt).bold().to_string())?;
                self.term.write_line("  [1] 옵션 A")?;
                self.term.write_line("  [2] 옵션 B")?;
                self.read_arm().await
            }
            RenderInstruction::Chat {
                banner,
                messages,
                input_hint,
            } => {
                if let Some(banner) = banner {
                    self.term.write_line("")?;
                    self.term.write_line(&style(banner).cyan().to_string())?;
                }
                self.show_transcript(messages)?;
                self.read_chat_line(input_hint).await
            }
            RenderInstruction::TimedOut {
                message,
                pause_secs,
            } => {
                self.term.write_line("")?;
                self.term
                    .write_line(&style(message).yellow().bold().to_string())?;
                sleep(Duration::from_secs(*pause_secs)).await;
                Ok(Some(SessionEvent::Advance))
            }
            RenderInstruction::Survey { warning } => self.fill_form(warning.as_deref()).await,
            RenderInstruction::Failure { message, .. } => {
                self.term
                    .write_line(&style(message).red().to_string())?;
                self.term.write_line("계속하려면 Enter를 누르세요.")?;
                Ok(self.read_line().await?.map(|_| SessionEvent::Advance))
            }
            RenderInstruction::Completed { message, .. } => {
                self.term.write_line("")?;
                self.term
                    .write_line(&style(message).green().bold().to_string())?;
                Ok(None)
            }
        }
    }

    /// Prints transcript entries that have not been shown yet.
    fn show_transcript(&mut self, messages: &[Message]) -> io::Result<()> {
        if messages.len() < self.printed {
            // Transcript was reset (new conversational phase).
            self.printed = 0;
        }
        for message in &messages[self.printed..] {
            let line = if message.is_assistant() {
                format!("{} {}", style("챗봇").cyan().bold(), message.content())
            } else {
                format!("{} {}", style("나").green().bold(), message.content())
            };
            self.term.write_line(&line)?;
        }
        self.printed = messages.len();
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn read_arm(&mut self) -> io::Result<Option<SessionEvent>> {
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            match line.trim() {
                "1" | "a" | "A" => return Ok(Some(SessionEvent::ArmChosen(ExperimentArm::Fixed))),
                "2" | "b" | "B" => {
                    return Ok(Some(SessionEvent::ArmChosen(ExperimentArm::Mirroring)))
                }
                _ => self.term.write_line("1 또는 2를 입력해 주세요.")?,
            }
        }
    }

    async fn read_chat_line(&mut self, input_hint: &str) -> io::Result<Option<SessionEvent>> {
        self.term
            .write_line(&style(format!("({input_hint})")).dim().to_string())?;
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            Ok(Some(SessionEvent::Advance))
        } else {
            Ok(Some(SessionEvent::MessageSubmitted(line)))
        }
    }

    /// Walks the survey form, keeping previously entered values.
    async fn fill_form(&mut self, warning: Option<&str>) -> io::Result<Option<SessionEvent>> {
        self.term.write_line("")?;
        self.term
            .write_line(&style("🔒 설문 응답").bold().to_string())?;
        self.term.write_line(
            "아래 항목에 응답해 주세요. 응답은 자동 저장되며, 대화 내용 저장은 선택사항입니다.",
        )?;
        if let Some(warning) = warning {
            self.term.write_line(&style(warning).red().to_string())?;
        }

        let gender = self
            .ask_select(SurveyField::Gender, &Gender::all(), Gender::label, self.form.gender)
            .await?;
        let Some(gender) = gender else { return Ok(None) };
        self.form.gender = gender;

        let age = self
            .ask_select(SurveyField::Age, &AgeBand::all(), AgeBand::label, self.form.age)
            .await?;
        let Some(age) = age else { return Ok(None) };
        self.form.age = age;

        let education = self
            .ask_select(
                SurveyField::Education,
                &Education::all(),
                Education::label,
                self.form.education,
            )
            .await?;
        let Some(education) = education else { return Ok(None) };
        self.form.education = education;

        let Some(job) = self.ask_job().await? else {
            return Ok(None);
        };
        self.form.job = job;

        for field in [
            SurveyField::Similarity,
            SurveyField::Trust,
            SurveyField::Enjoyment,
            SurveyField::Humanness,
            SurveyField::ReuseIntent,
            SurveyField::Usefulness,
        ] {
            let current = self.likert_answer(field);
            let answer = self
                .ask_select(field, &LikertResponse::all(), LikertResponse::label, current)
                .await?;
            let Some(answer) = answer else { return Ok(None) };
            self.set_likert_answer(field, answer);
        }

        let Some(save) = self.ask_save_transcript().await? else {
            return Ok(None);
        };
        self.form.save_transcript = save;

        Ok(Some(SessionEvent::SurveySubmitted(self.form.clone())))
    }

    /// Asks one select question; `0` is the placeholder, empty input keeps
    /// the current answer.
    async fn ask_select<T: Copy>(
        &mut self,
        field: SurveyField,
        options: &[T],
        label: impl Fn(&T) -> &'static str,
        current: Option<T>,
    ) -> io::Result<Option<Option<T>>> {
        self.term.write_line("")?;
        self.term.write_line(field.prompt())?;
        let mut listing = String::from("  [0] 선택 안 함");
        for (i, option) in options.iter().enumerate() {
            listing.push_str(&format!("  [{}] {}", i + 1, label(option)));
        }
        self.term.write_line(&listing)?;
        if let Some(current) = current {
            self.term.write_line(
                &style(format!("(현재: {} / Enter로 유지)", label(&current)))
                    .dim()
                    .to_string(),
            )?;
        }

        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return Ok(Some(current));
            }
            match trimmed.parse::<usize>() {
                Ok(0) => return Ok(Some(None)),
                Ok(n) if n <= options.len() => return Ok(Some(Some(options[n - 1]))),
                _ => self.term.write_line("번호를 입력해 주세요.")?,
            }
        }
    }

    async fn ask_job(&mut self) -> io::Result<Option<String>> {
        self.term.write_line("")?;
        self.term.write_line(SurveyField::Job.prompt())?;
        if !self.form.job.trim().is_empty() {
            self.term.write_line(
                &style(format!("(현재: {} / Enter로 유지)", self.form.job))
                    .dim()
                    .to_string(),
            )?;
        }
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            Ok(Some(self.form.job.clone()))
        } else {
            Ok(Some(line.trim().to_string()))
        }
    }

    async fn ask_save_transcript(&mut self) -> io::Result<Option<bool>> {
        self.term.write_line("")?;
        self.term
            .write_line("✅ 대화 내용도 함께 저장하시겠습니까? (y/N)")?;
        let Some(line) = self.read_line().await? else {
            return Ok(None);
        };
        Ok(Some(matches!(line.trim(), "y" | "Y")))
    }

    fn likert_answer(&self, field: SurveyField) -> Option<LikertResponse> {
        match field {
            SurveyField::Similarity => self.form.similarity,
            SurveyField::Trust => self.form.trust,
            SurveyField::Enjoyment => self.form.enjoyment,
            SurveyField::Humanness => self.form.humanness,
            SurveyField::ReuseIntent => self.form.reuse_intent,
            SurveyField::Usefulness => self.form.usefulness,
            _ => None,
        }
    }

    fn set_likert_answer(&mut self, field: SurveyField, answer: Option<LikertResponse>) {
        match field {
            SurveyField::Similarity => self.form.similarity = answer,
            SurveyField::Trust => self.form.trust = answer,
            SurveyField::Enjoyment => self.form.enjoyment = answer,
            SurveyField::Humanness => self.form.humanness = answer,
            SurveyField::ReuseIntent => self.form.reuse_intent = answer,
            SurveyField::Usefulness => self.form.usefulness = answer,
            _ => {}
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}
