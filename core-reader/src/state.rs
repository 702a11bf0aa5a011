//! Pure view-state machine.
//!
//! `step` computes the next view from the current one and a navigation
//! event, with no side effects. The controller owns the persistence and
//! event-bus consequences; everything here is a value-in, value-out
//! transition that the tests can drive exhaustively.

use core_store::{Book, BookId, ChapterRef};

/// The active view of the reading session.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Keyword search over the remote catalog.
    Search,
    /// The personal shelf.
    Shelf,
    /// Metadata and table of contents for one selected book.
    Detail { book: Book },
    /// An open reading session.
    Reader {
        book: Book,
        chapters: Vec<ChapterRef>,
        current_index: usize,
    },
}

impl ViewState {
    /// Stable label for events and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Search => "search",
            ViewState::Shelf => "shelf",
            ViewState::Detail { .. } => "detail",
            ViewState::Reader { .. } => "reader",
        }
    }

    /// The book the view is focused on, if any.
    pub fn book(&self) -> Option<&Book> {
        match self {
            ViewState::Detail { book } | ViewState::Reader { book, .. } => Some(book),
            _ => None,
        }
    }
}

/// A navigation request against the view machine.
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// Nav-bar switch to the search view. Ignored while reading.
    ToggleSearch,
    /// Nav-bar switch to the shelf view. Ignored while reading.
    ToggleShelf,
    /// Select a book (shelf entry or search candidate) for its detail view.
    Open { book: Book },
    /// Begin a reading session at `index` within `chapters`.
    StartReading {
        chapters: Vec<ChapterRef>,
        index: usize,
    },
    /// Jump to a chapter by index within the open session.
    SetChapter(usize),
    /// Advance one chapter.
    NextChapter,
    /// Go back one chapter.
    PrevChapter,
    /// Leave the current view: Reader returns to Detail, Detail to Shelf.
    Back,
    /// A book was removed from the shelf; a Detail view of it must close.
    ShelfBookRemoved { id: BookId },
}

/// Which end of the table of contents a rejected navigation hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSignal {
    FirstChapterReached,
    LastChapterReached,
}

/// Outcome of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The view after the event. Equals the input view for no-op events.
    pub state: ViewState,
    /// Boundary signal for rejected chapter navigation.
    pub signal: Option<NavSignal>,
    /// Index of the chapter entered by this event, if one was entered.
    pub entered_chapter: Option<usize>,
}

impl Step {
    fn stay(state: ViewState) -> Self {
        Self {
            state,
            signal: None,
            entered_chapter: None,
        }
    }

    fn go(state: ViewState) -> Self {
        Self::stay(state)
    }

    fn rejected(state: ViewState, signal: NavSignal) -> Self {
        Self {
            state,
            signal: Some(signal),
            entered_chapter: None,
        }
    }
}

/// Compute the next view for `event`.
///
/// Out-of-range chapter navigation never changes the view; it returns the
/// input state with a boundary signal. Reader ignores nav-bar toggles.
pub fn step(state: ViewState, event: NavEvent) -> Step {
    match (state, event) {
        // Nav-bar toggles apply everywhere except an open session.
        (state @ ViewState::Reader { .. }, NavEvent::ToggleSearch)
        | (state @ ViewState::Reader { .. }, NavEvent::ToggleShelf) => Step::stay(state),
        (_, NavEvent::ToggleSearch) => Step::go(ViewState::Search),
        (_, NavEvent::ToggleShelf) => Step::go(ViewState::Shelf),

        (state @ ViewState::Reader { .. }, NavEvent::Open { .. }) => Step::stay(state),
        (_, NavEvent::Open { book }) => Step::go(ViewState::Detail { book }),

        (ViewState::Detail { book }, NavEvent::StartReading { chapters, index }) => {
            if index < chapters.len() {
                let mut step = Step::go(ViewState::Reader {
                    book,
                    chapters,
                    current_index: index,
                });
                step.entered_chapter = Some(index);
                step
            } else {
                Step::rejected(ViewState::Detail { book }, NavSignal::LastChapterReached)
            }
        }
        (state, NavEvent::StartReading { .. }) => Step::stay(state),

        (
            ViewState::Reader {
                book,
                chapters,
                current_index,
            },
            NavEvent::SetChapter(index),
        ) => {
            if index < chapters.len() {
                let mut step = Step::go(ViewState::Reader {
                    book,
                    chapters,
                    current_index: index,
                });
                step.entered_chapter = Some(index);
                step
            } else {
                Step::rejected(
                    ViewState::Reader {
                        book,
                        chapters,
                        current_index,
                    },
                    NavSignal::LastChapterReached,
                )
            }
        }
        (
            ViewState::Reader {
                book,
                chapters,
                current_index,
            },
            NavEvent::NextChapter,
        ) => {
            if current_index + 1 < chapters.len() {
                let next = current_index + 1;
                let mut step = Step::go(ViewState::Reader {
                    book,
                    chapters,
                    current_index: next,
                });
                step.entered_chapter = Some(next);
                step
            } else {
                Step::rejected(
                    ViewState::Reader {
                        book,
                        chapters,
                        current_index,
                    },
                    NavSignal::LastChapterReached,
                )
            }
        }
        (
            ViewState::Reader {
                book,
                chapters,
                current_index,
            },
            NavEvent::PrevChapter,
        ) => {
            if current_index > 0 {
                let prev = current_index - 1;
                let mut step = Step::go(ViewState::Reader {
                    book,
                    chapters,
                    current_index: prev,
                });
                step.entered_chapter = Some(prev);
                step
            } else {
                Step::rejected(
                    ViewState::Reader {
                        book,
                        chapters,
                        current_index,
                    },
                    NavSignal::FirstChapterReached,
                )
            }
        }
        (state, NavEvent::SetChapter(_))
        | (state, NavEvent::NextChapter)
        | (state, NavEvent::PrevChapter) => Step::stay(state),

        (ViewState::Reader { book, .. }, NavEvent::Back) => Step::go(ViewState::Detail { book }),
        (ViewState::Detail { .. }, NavEvent::Back) => Step::go(ViewState::Shelf),
        (state, NavEvent::Back) => Step::stay(state),

        (ViewState::Detail { book }, NavEvent::ShelfBookRemoved { id }) => {
            if book.id == id {
                Step::go(ViewState::Shelf)
            } else {
                Step::stay(ViewState::Detail { book })
            }
        }
        (state, NavEvent::ShelfBookRemoved { .. }) => Step::stay(state),
    }
}
