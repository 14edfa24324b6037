//! crates/concierge_core/src/tour.rs
//!
//! The guided-tour state machine: one authoritative step-transition table
//! consumed by a single sequencer. Each step carries its narration, its
//! scroll anchor, its quick replies and its advance policy. Timers and
//! speech playback live in the service layer; the sequencer only tells the
//! caller what to render and what to schedule.

use crate::domain::{ChatMessage, ChatSender, QuickReply, Session, TourAction, TourStep};
use std::time::Duration;

/// Fixed delay before a presentation step hands over to its successor.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(6);

/// The section whose visibility triggers the one-shot "thanks for browsing"
/// message after a declined tour.
pub const TERMINAL_SECTION: &str = "contact";

//=========================================================================================
// Step table
//=========================================================================================

/// How a step leaves: on a timer, or on an explicit user choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Presentation step: advances to `next` after `delay` once its content
    /// begins rendering.
    Auto { next: TourStep, delay: Duration },
    /// Interactive step: waits indefinitely for a quick-reply choice.
    AwaitUser,
}

pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
}

pub const PROJECTS: &[Project] = &[
    Project {
        title: "AI-Powered Smart Detection of Crops and Weeds",
        description: "A YOLO and OpenCV pipeline that tells crops from weeds in field imagery, so herbicide is applied only where it is needed.",
    },
    Project {
        title: "Search Engine for Movie Summaries",
        description: "A PySpark and Hadoop search engine over a large corpus of movie plot summaries, ranked with TF-IDF scoring.",
    },
    Project {
        title: "Facial Recognition Attendance System",
        description: "An OpenCV-based attendance system that recognizes enrolled faces in real time and logs attendance automatically.",
    },
    Project {
        title: "Mushroom Classification using Scikit-Learn",
        description: "A Scikit-Learn classifier that predicts whether a mushroom is edible or poisonous from its physical characteristics.",
    },
    Project {
        title: "Custom Process Scheduler Development",
        description: "A process scheduler built in C that implements and compares multiple scheduling policies at the systems level.",
    },
];

struct StepSpec {
    narration: &'static [&'static str],
    scroll_target: Option<&'static str>,
    advance: AdvancePolicy,
}

/// The single authoritative step table.
fn step_spec(step: TourStep) -> StepSpec {
    use TourStep::*;
    match step {
        Greeting => StepSpec {
            narration: &["Hi there! I'm your portfolio assistant. Would you like me to walk you through Chakradhar's resume?"],
            scroll_target: None,
            advance: AdvancePolicy::AwaitUser,
        },
        SummaryIntro => StepSpec {
            narration: &["Let's start with the professional summary. Chakradhar is a versatile software engineer and machine learning practitioner who has delivered scalable, secure applications with Python, React and Node."],
            scroll_target: Some("summary"),
            advance: AdvancePolicy::Auto { next: SkillsIntro, delay: AUTO_ADVANCE_DELAY },
        },
        SkillsIntro => StepSpec {
            narration: &["Next up, technical skills. The toolbox spans Python, Java, JavaScript and C++, frameworks like React and Django, and data tooling such as PySpark, Hadoop and Scikit-Learn."],
            scroll_target: Some("skills"),
            advance: AdvancePolicy::Auto { next: ExperienceIntro, delay: AUTO_ADVANCE_DELAY },
        },
        ExperienceIntro => StepSpec {
            narration: &["Here is the work experience: an internship at NSIC building a responsive e-commerce platform, and a project associateship at Zoho streamlining a video conferencing backend with WebRTC."],
            scroll_target: Some("experience"),
            advance: AdvancePolicy::Auto { next: ProjectsListIntro, delay: AUTO_ADVANCE_DELAY },
        },
        ProjectsListIntro => StepSpec {
            narration: &["Now for the projects showcase. Pick any project below and I'll tell you more about it."],
            scroll_target: Some("projects"),
            advance: AdvancePolicy::AwaitUser,
        },
        ProjectsDetail => StepSpec {
            // Content is built from the selected project at transition time.
            narration: &[],
            scroll_target: Some("projects"),
            advance: AdvancePolicy::AwaitUser,
        },
        EducationIntro => StepSpec {
            narration: &["On to education: a Master of Science in Computer Science at The University of Texas at Dallas, after a Bachelor of Engineering from R.M.K Engineering College."],
            scroll_target: Some("education"),
            advance: AdvancePolicy::Auto { next: CertificationsIntro, delay: AUTO_ADVANCE_DELAY },
        },
        CertificationsIntro => StepSpec {
            narration: &["Certifications include IBM DevOps and Software Engineering, Microsoft Full-Stack Developer, Meta Back-End Developer and AWS Certified Cloud Practitioner."],
            scroll_target: Some("certifications"),
            advance: AdvancePolicy::Auto { next: PublicationIntro, delay: AUTO_ADVANCE_DELAY },
        },
        PublicationIntro => StepSpec {
            narration: &["There is also a publication: Text Detection Based on Deep Learning, presented at IEEE's International Conference on Intelligent Data Communication and Analytics."],
            scroll_target: Some("publication"),
            advance: AdvancePolicy::Auto { next: AdditionalInfoIntro, delay: AUTO_ADVANCE_DELAY },
        },
        AdditionalInfoIntro => StepSpec {
            narration: &["A few more things: Chakradhar works comfortably in Agile teams, is strong on API design and unit testing, and keeps up with cloud technologies."],
            scroll_target: Some("about"),
            advance: AdvancePolicy::Auto { next: EndTourPrompt, delay: AUTO_ADVANCE_DELAY },
        },
        EndTourPrompt => StepSpec {
            narration: &["That's the complete tour. Would you like to know more about anything else?"],
            scroll_target: None,
            advance: AdvancePolicy::AwaitUser,
        },
        Ended => StepSpec {
            narration: &["Thanks for stopping by! Have a great day."],
            scroll_target: None,
            advance: AdvancePolicy::AwaitUser,
        },
    }
}

/// The advance policy for a step, as recorded in the step table.
pub fn advance_policy(step: TourStep) -> AdvancePolicy {
    step_spec(step).advance
}

fn project_quick_replies() -> Vec<QuickReply> {
    let mut replies: Vec<QuickReply> = PROJECTS
        .iter()
        .enumerate()
        .map(|(index, project)| QuickReply {
            label: project.title.to_string(),
            action: TourAction::ShowProject { index },
        })
        .collect();
    replies.push(QuickReply {
        label: "Next Section: Education".to_string(),
        action: TourAction::GoTo {
            step: TourStep::EducationIntro,
        },
    });
    replies
}

fn quick_replies_for(step: TourStep) -> Vec<QuickReply> {
    match step {
        TourStep::Greeting => vec![
            QuickReply {
                label: "Yes, please!".to_string(),
                action: TourAction::StartTour,
            },
            QuickReply {
                label: "No thanks".to_string(),
                action: TourAction::DeclineTour,
            },
        ],
        TourStep::ProjectsListIntro | TourStep::ProjectsDetail => project_quick_replies(),
        TourStep::EndTourPrompt => vec![
            QuickReply {
                label: "Ask a question".to_string(),
                action: TourAction::AskQuestion,
            },
            QuickReply {
                label: "Download resume".to_string(),
                action: TourAction::DownloadResume,
            },
            QuickReply {
                label: "End chat".to_string(),
                action: TourAction::EndChat,
            },
        ],
        _ => Vec::new(),
    }
}

//=========================================================================================
// Sequencer
//=========================================================================================

/// Everything the caller must do after a transition: render these messages,
/// scroll there, offer these buttons, and (for presentation steps) schedule
/// the successor. The caller is responsible for tearing down the previous
/// step's pending timer and speech before acting on a new output.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub step: TourStep,
    pub messages: Vec<ChatMessage>,
    pub scroll_target: Option<&'static str>,
    pub quick_replies: Vec<QuickReply>,
    pub auto_advance: Option<(TourStep, Duration)>,
}

/// Directive returned when a paused tour resumes: re-enter the step without
/// replaying its already-rendered messages.
#[derive(Debug, Clone)]
pub struct ResumeOutput {
    pub step: TourStep,
    pub quick_replies: Vec<QuickReply>,
    pub auto_advance: Option<(TourStep, Duration)>,
}

/// The single owner of all conversation state for one session.
pub struct TourSequencer {
    current: TourStep,
    next_message_id: u64,
    transcript: Vec<ChatMessage>,
    quick_replies: Vec<QuickReply>,
    greeted: bool,
    declined: bool,
    paused: bool,
    thanks_shown: bool,
    selected_project: Option<usize>,
}

impl TourSequencer {
    pub fn new() -> Self {
        Self {
            current: TourStep::Greeting,
            next_message_id: 1,
            transcript: Vec::new(),
            quick_replies: Vec::new(),
            greeted: false,
            declined: false,
            paused: false,
            thanks_shown: false,
            selected_project: None,
        }
    }

    /// Rebuilds a sequencer from persisted session state. The transcript is
    /// not persisted; a reconnecting client starts with an empty pane but
    /// keeps its place in the tour, including the current step's buttons.
    pub fn restore(session: &Session) -> Self {
        let mut seq = Self::new();
        seq.current = session.current_step;
        seq.greeted = session.current_step != TourStep::Greeting || session.declined;
        seq.declined = session.declined;
        seq.paused = session.paused;
        seq.thanks_shown = session.thanks_shown;
        seq.quick_replies = quick_replies_for(session.current_step);
        seq
    }

    pub fn current_step(&self) -> TourStep {
        self.current
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn declined(&self) -> bool {
        self.declined
    }

    pub fn thanks_shown(&self) -> bool {
        self.thanks_shown
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    fn push_message(&mut self, sender: ChatSender, content: String, speakable: Option<String>) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_message_id,
            sender,
            content,
            speakable,
        };
        self.next_message_id += 1;
        self.transcript.push(message.clone());
        message
    }

    /// Renders the initial greeting. Idempotent: once greeted, returns `None`.
    pub fn greet(&mut self) -> Option<StepOutput> {
        if self.greeted {
            return None;
        }
        self.greeted = true;
        Some(self.enter(TourStep::Greeting))
    }

    /// Transitions to `step`, appending its narration and replacing the
    /// quick replies. The previous step's pending work must already have
    /// been torn down by the caller.
    pub fn enter(&mut self, step: TourStep) -> StepOutput {
        self.current = step;
        self.paused = false;
        let spec = step_spec(step);

        let mut messages = Vec::new();
        for narration in spec.narration {
            messages.push(self.push_message(ChatSender::Assistant, narration.to_string(), None));
        }
        if step == TourStep::ProjectsListIntro {
            let mut listing = String::from("Here are the projects:");
            for project in PROJECTS {
                listing.push_str("\n- ");
                listing.push_str(project.title);
            }
            let titles: Vec<&str> = PROJECTS.iter().map(|p| p.title).collect();
            let speakable = format!("The projects are: {}.", titles.join(", "));
            messages.push(self.push_message(ChatSender::Assistant, listing, Some(speakable)));
        }
        if step == TourStep::ProjectsDetail {
            if let Some(project) = self.selected_project.and_then(|i| PROJECTS.get(i)) {
                let content = format!("Here's a bit about \"{}\": {}", project.title, project.description);
                messages.push(self.push_message(ChatSender::Assistant, content, None));
            }
        }

        self.quick_replies = quick_replies_for(step);
        StepOutput {
            step,
            messages,
            scroll_target: spec.scroll_target,
            quick_replies: self.quick_replies.clone(),
            auto_advance: match spec.advance {
                AdvancePolicy::Auto { next, delay } => Some((next, delay)),
                AdvancePolicy::AwaitUser => None,
            },
        }
    }

    /// Applies a quick-reply choice. The clicked label is echoed into the
    /// transcript as a user message before the transition renders.
    pub fn apply(&mut self, action: TourAction) -> StepOutput {
        if let Some(reply) = self.quick_replies.iter().find(|r| r.action == action) {
            let label = reply.label.clone();
            self.push_message(ChatSender::User, label, None);
        }

        match action {
            TourAction::StartTour => self.enter(TourStep::SummaryIntro),
            TourAction::DeclineTour => {
                self.declined = true;
                self.enter(TourStep::Ended)
            }
            TourAction::GoTo { step } => self.enter(step),
            TourAction::ShowProject { index } => {
                self.selected_project = Some(index);
                self.enter(TourStep::ProjectsDetail)
            }
            TourAction::AskQuestion => {
                let message = self.push_message(
                    ChatSender::Assistant,
                    "Great! What would you like to know about Chakradhar?".to_string(),
                    None,
                );
                self.quick_replies = vec![QuickReply {
                    label: "End chat".to_string(),
                    action: TourAction::EndChat,
                }];
                StepOutput {
                    step: self.current,
                    messages: vec![message],
                    scroll_target: None,
                    quick_replies: self.quick_replies.clone(),
                    auto_advance: None,
                }
            }
            TourAction::DownloadResume => {
                let message = self.push_message(
                    ChatSender::Assistant,
                    "You got it! The download should start automatically.".to_string(),
                    None,
                );
                self.quick_replies = vec![QuickReply {
                    label: "End chat".to_string(),
                    action: TourAction::EndChat,
                }];
                StepOutput {
                    step: self.current,
                    messages: vec![message],
                    scroll_target: None,
                    quick_replies: self.quick_replies.clone(),
                    auto_advance: None,
                }
            }
            TourAction::EndChat => self.enter(TourStep::Ended),
        }
    }

    /// Called when the chat panel closes. Returns `true` if an auto-advancing
    /// step was interrupted and the tour is now paused (the caller must have
    /// cancelled the pending timer and speech).
    pub fn pause(&mut self) -> bool {
        if matches!(advance_policy(self.current), AdvancePolicy::Auto { .. }) {
            self.paused = true;
            true
        } else {
            false
        }
    }

    /// Called when the chat panel reopens after a pause. Re-enters the paused
    /// step without re-appending its narration: the messages were already
    /// rendered and spoken before the interruption.
    pub fn resume(&mut self) -> Option<ResumeOutput> {
        if !self.paused {
            return None;
        }
        self.paused = false;
        let spec = step_spec(self.current);
        Some(ResumeOutput {
            step: self.current,
            quick_replies: self.quick_replies.clone(),
            auto_advance: match spec.advance {
                AdvancePolicy::Auto { next, delay } => Some((next, delay)),
                AdvancePolicy::AwaitUser => None,
            },
        })
    }

    /// Called when the chat reopens after the tour has ended: offer a
    /// restart instead of replaying the greeting.
    pub fn reopen(&mut self) -> Option<StepOutput> {
        if self.current != TourStep::Ended || !self.greeted {
            return None;
        }
        let message = self.push_message(
            ChatSender::Assistant,
            "Welcome back! How can I help you today?".to_string(),
            None,
        );
        self.quick_replies = vec![
            QuickReply {
                label: "Resume Walkthrough".to_string(),
                action: TourAction::GoTo {
                    step: TourStep::SummaryIntro,
                },
            },
            QuickReply {
                label: "Just Browsing".to_string(),
                action: TourAction::EndChat,
            },
        ];
        Some(StepOutput {
            step: self.current,
            messages: vec![message],
            scroll_target: None,
            quick_replies: self.quick_replies.clone(),
            auto_advance: None,
        })
    }

    /// Reacts to a page section entering the viewport. After a declined
    /// tour, the terminal section triggers exactly one unsolicited message,
    /// no matter how often it re-enters view.
    pub fn section_visible(&mut self, section: &str) -> Option<ChatMessage> {
        if section != TERMINAL_SECTION || !self.declined || self.thanks_shown {
            return None;
        }
        self.thanks_shown = true;
        Some(self.push_message(
            ChatSender::Assistant,
            "Thanks for exploring! Have any questions about Chakradhar's work or experience?"
                .to_string(),
            None,
        ))
    }

    /// Appends a free-text user question to the transcript.
    pub fn record_question(&mut self, text: &str) -> ChatMessage {
        self.quick_replies.clear();
        self.push_message(ChatSender::User, text.to_string(), None)
    }

    /// Appends an assistant answer to the transcript.
    pub fn record_answer(&mut self, text: &str) -> ChatMessage {
        self.push_message(ChatSender::Assistant, text.to_string(), None)
    }
}

impl Default for TourSequencer {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_renders_once() {
        let mut seq = TourSequencer::new();
        let output = seq.greet().expect("first greeting should render");
        assert_eq!(output.step, TourStep::Greeting);
        assert_eq!(output.quick_replies.len(), 2);
        assert!(output.auto_advance.is_none());
        assert!(seq.greet().is_none());
    }

    #[test]
    fn presentation_steps_chain_and_interactive_steps_wait() {
        use TourStep::*;
        for (step, expected_next) in [
            (SummaryIntro, SkillsIntro),
            (SkillsIntro, ExperienceIntro),
            (ExperienceIntro, ProjectsListIntro),
            (EducationIntro, CertificationsIntro),
            (CertificationsIntro, PublicationIntro),
            (PublicationIntro, AdditionalInfoIntro),
            (AdditionalInfoIntro, EndTourPrompt),
        ] {
            match advance_policy(step) {
                AdvancePolicy::Auto { next, .. } => assert_eq!(next, expected_next),
                AdvancePolicy::AwaitUser => panic!("{step:?} should auto-advance"),
            }
        }
        for step in [Greeting, ProjectsListIntro, ProjectsDetail, EndTourPrompt, Ended] {
            assert_eq!(advance_policy(step), AdvancePolicy::AwaitUser);
        }
    }

    #[test]
    fn message_ids_are_unique_and_monotonic() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::StartTour);
        seq.enter(TourStep::ProjectsListIntro);
        let ids: Vec<u64> = seq.transcript().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted, "transcript ids must be strictly increasing");
    }

    #[test]
    fn quick_replies_are_replaced_not_merged() {
        let mut seq = TourSequencer::new();
        seq.greet();
        let output = seq.apply(TourAction::StartTour);
        assert!(output.quick_replies.is_empty(), "presentation steps offer no buttons");
        let output = seq.enter(TourStep::ProjectsListIntro);
        assert_eq!(output.quick_replies.len(), PROJECTS.len() + 1);
        let output = seq.enter(TourStep::EducationIntro);
        assert!(output.quick_replies.is_empty());
    }

    #[test]
    fn start_tour_echoes_the_clicked_label() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::StartTour);
        let user_messages: Vec<_> = seq
            .transcript()
            .iter()
            .filter(|m| m.sender == ChatSender::User)
            .collect();
        assert_eq!(user_messages.len(), 1);
        assert_eq!(user_messages[0].content, "Yes, please!");
    }

    #[test]
    fn project_detail_uses_the_selected_project() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::StartTour);
        seq.enter(TourStep::ProjectsListIntro);
        let output = seq.apply(TourAction::ShowProject { index: 2 });
        assert_eq!(output.step, TourStep::ProjectsDetail);
        assert!(output.messages.last().unwrap().content.contains(PROJECTS[2].title));
        // Detail steps keep offering the project list plus the escape hatch.
        assert_eq!(output.quick_replies.len(), PROJECTS.len() + 1);
    }

    #[test]
    fn pause_only_applies_to_auto_advancing_steps() {
        let mut seq = TourSequencer::new();
        seq.greet();
        assert!(!seq.pause(), "greeting is interactive; closing is not a pause");
        seq.apply(TourAction::StartTour);
        assert!(seq.pause());
        assert!(seq.is_paused());
    }

    #[test]
    fn resume_returns_to_the_paused_step_without_replaying_messages() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::StartTour);
        let rendered = seq.transcript().len();
        assert!(seq.pause());
        let resumed = seq.resume().expect("paused tour should resume");
        assert_eq!(resumed.step, TourStep::SummaryIntro);
        assert!(resumed.auto_advance.is_some());
        assert_eq!(seq.transcript().len(), rendered, "no messages replayed on resume");
        assert!(seq.resume().is_none(), "resume is one-shot until paused again");
    }

    #[test]
    fn declined_tour_thanks_exactly_once_on_terminal_section() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::DeclineTour);
        assert!(seq.section_visible("summary").is_none());
        let thanks = seq.section_visible(TERMINAL_SECTION);
        assert!(thanks.is_some());
        // Re-entering view never fires a second time.
        assert!(seq.section_visible(TERMINAL_SECTION).is_none());
        assert!(seq.section_visible(TERMINAL_SECTION).is_none());
    }

    #[test]
    fn no_thanks_message_without_a_declined_tour() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::StartTour);
        assert!(seq.section_visible(TERMINAL_SECTION).is_none());
    }

    #[test]
    fn reopen_after_end_offers_a_restart() {
        let mut seq = TourSequencer::new();
        seq.greet();
        seq.apply(TourAction::DeclineTour);
        let output = seq.reopen().expect("ended chat should greet again on reopen");
        assert_eq!(output.quick_replies.len(), 2);
        let restart = seq.apply(TourAction::GoTo { step: TourStep::SummaryIntro });
        assert_eq!(restart.step, TourStep::SummaryIntro);
    }

    #[test]
    fn restore_at_an_interactive_step_reoffers_its_buttons() {
        use chrono::Utc;
        for (step, expected) in [
            (TourStep::ProjectsListIntro, PROJECTS.len() + 1),
            (TourStep::EndTourPrompt, 3),
        ] {
            let session = Session {
                id: uuid::Uuid::new_v4(),
                current_step: step,
                paused: false,
                declined: false,
                thanks_shown: false,
                created_at: Utc::now(),
                last_accessed_at: Utc::now(),
            };
            let seq = TourSequencer::restore(&session);
            assert_eq!(
                seq.quick_replies().len(),
                expected,
                "a reconnecting client at {step:?} must get its buttons back"
            );
        }
    }

    #[test]
    fn restore_resumes_from_persisted_state() {
        use chrono::Utc;
        let session = Session {
            id: uuid::Uuid::new_v4(),
            current_step: TourStep::SkillsIntro,
            paused: true,
            declined: false,
            thanks_shown: false,
            created_at: Utc::now(),
            last_accessed_at: Utc::now(),
        };
        let mut seq = TourSequencer::restore(&session);
        assert_eq!(seq.current_step(), TourStep::SkillsIntro);
        let resumed = seq.resume().expect("restored pause should resume");
        assert_eq!(resumed.step, TourStep::SkillsIntro);
        assert!(seq.greet().is_none(), "restored sessions are not re-greeted");
    }
}
