//! Page access and answer-control heuristics for QuizPilot.
//!
//! [`DocumentTree`] is the only view of the page the rest of the workspace
//! gets. Everything else here is a pure function over it: where the question
//! panel is, which radio to pick, which button submits, which one advances,
//! and whether the platform has revealed the correct option yet.

pub mod controls;
pub mod dom;
pub mod filters;
pub mod heuristics;
pub mod html;
pub mod memory;
pub mod panel;
pub mod reveal;
pub mod selector;
pub mod wait;

pub use controls::{
    checked_radio, choose_longest, fill_text_fields, find_next, find_submit, list_options,
    option_container, radio_text, safe_click, select_option, OptionChoice,
};
pub use dom::{DocumentTree, DomEvent, NodeId, PageLocation};
pub use filters::{is_banned, normalize_for_compare, option_text, sanitize_text};
pub use heuristics::Heuristics;
pub use html::load_html;
pub use memory::{Interaction, MemoryDocument, RecordedInteraction};
pub use panel::{extract_prompt, find_question_panel, question_key_for, visible_radios};
pub use reveal::{detect_correct_option, RevealedOption};
pub use selector::{query_selector, query_selector_all, Selector};
pub use wait::wait_for;
