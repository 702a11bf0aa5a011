//! # Navigation Controller
//!
//! The host-facing surface of a reading session.
//!
//! ## Overview
//!
//! `NavigationController` owns the four stores, the three fetch
//! coordinators, the event bus, and the current [`ViewState`]. Hosts drive
//! it with navigation calls and observe it through [`subscribe`]; every view
//! change, shelf mutation, chapter entry, and fetch lifecycle is emitted on
//! the bus.
//!
//! A fetch failure never changes the view: it is re-raised to the caller and
//! mirrored as a recoverable `Fetch` event, and the next call retries from
//! scratch because the coordinators reset on error.
//!
//! [`subscribe`]: NavigationController::subscribe

use crate::error::{ReaderError, Result};
use crate::state::{step, NavEvent, NavSignal, Step, ViewState};
use chrono::Utc;
use core_fetch::{
    BookDetail, CatalogClient, ContentFetch, DetailFetch, FetchCoordinator, SearchFetch,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{
    ChapterBoundary, EventBus, FetchEvent, ReaderEvent, ReadingEvent, Receiver, ShelfEvent,
    ViewEvent,
};
use core_store::{
    Book, BookId, ChapterContent, ChapterRef, DisplaySettings, DisplaySettingsPatch, HistoryStore,
    LibraryStore, ProgressStore, ReadingProgress, SettingsStore,
};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

pub struct NavigationController {
    library: LibraryStore,
    progress: ProgressStore,
    settings: SettingsStore,
    history: HistoryStore,
    search: FetchCoordinator<SearchFetch>,
    detail: FetchCoordinator<DetailFetch>,
    content: FetchCoordinator<ContentFetch>,
    state: Mutex<ViewState>,
    events: EventBus,
}

impl NavigationController {
    /// Build a controller from an assembled [`CoreConfig`].
    ///
    /// The initial view is the shelf when the library already holds books,
    /// otherwise search.
    pub fn new(config: &CoreConfig) -> Self {
        let kv = config.key_value_store.clone();
        let library = LibraryStore::new(kv.clone());
        let initial = if library.list().is_empty() {
            ViewState::Search
        } else {
            ViewState::Shelf
        };
        debug!(view = initial.label(), "Controller initialized");

        let client = CatalogClient::new(config.transport.clone());

        Self {
            library,
            progress: ProgressStore::new(kv.clone()),
            settings: SettingsStore::new(kv.clone()),
            history: HistoryStore::with_limit(kv, config.history_limit),
            search: FetchCoordinator::new("search", SearchFetch::new(client.clone())),
            detail: FetchCoordinator::new("detail", DetailFetch::new(client.clone())),
            content: FetchCoordinator::new("chapter", ContentFetch::new(client)),
            state: Mutex::new(initial),
            events: EventBus::new(config.event_buffer),
        }
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ViewState {
        self.lock_state().clone()
    }

    /// Subscribe to the controller's event bus.
    pub fn subscribe(&self) -> Receiver<ReaderEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // View navigation
    // ------------------------------------------------------------------

    /// Nav-bar switch to the search view. Ignored while reading.
    pub fn toggle_search(&self) -> ViewState {
        self.apply(NavEvent::ToggleSearch).state
    }

    /// Nav-bar switch to the shelf view. Ignored while reading.
    pub fn toggle_shelf(&self) -> ViewState {
        self.apply(NavEvent::ToggleShelf).state
    }

    /// Select a book (shelf entry or search candidate) for its detail view.
    pub fn open_book(&self, book: Book) -> ViewState {
        self.apply(NavEvent::Open { book }).state
    }

    /// Leave the current view: Reader returns to Detail, Detail to Shelf.
    ///
    /// Returning from a session does not re-fetch the table of contents;
    /// the detail coordinator still caches it.
    pub fn back(&self) -> ViewState {
        self.apply(NavEvent::Back).state
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Search the catalog for `keyword`.
    ///
    /// A successful search records the keyword in history; a failed one
    /// records nothing and leaves the view untouched.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<Book>> {
        let key = keyword.trim().to_string();
        self.emit(ReaderEvent::Fetch(FetchEvent::Started {
            resource: "search".to_string(),
            key: key.clone(),
        }));

        match self.search.request(key.clone()).await {
            Ok(books) => {
                self.emit(ReaderEvent::Fetch(FetchEvent::Completed {
                    resource: "search".to_string(),
                    key: key.clone(),
                }));
                // History failures must not fail the search itself.
                if let Err(e) = self.history.add(&key) {
                    warn!(keyword = %key, error = %e, "Failed to record search history");
                }
                Ok(books)
            }
            Err(e) => {
                self.emit(ReaderEvent::Fetch(FetchEvent::Failed {
                    resource: "search".to_string(),
                    key,
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }

    /// Recent search keywords, most recent first.
    pub fn search_history(&self) -> Vec<String> {
        self.history.list()
    }

    /// Forget all recorded search keywords.
    pub fn clear_search_history(&self) -> Result<()> {
        self.history.clear()?;
        self.emit(ReaderEvent::View(ViewEvent::HistoryCleared));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shelf
    // ------------------------------------------------------------------

    /// Books on the shelf, most recently added first.
    pub fn shelf(&self) -> Vec<Book> {
        self.library.list()
    }

    /// Add a book to the shelf. Returns false when it was already there.
    /// Does not change the view.
    pub fn add_to_shelf(&self, book: Book) -> Result<bool> {
        let book_id = book.id.clone();
        let title = book.title.clone();
        let added = self.library.add(book)?;
        if added {
            self.emit(ReaderEvent::Shelf(ShelfEvent::BookAdded {
                book_id: book_id.into_string(),
                title,
            }));
        }
        Ok(added)
    }

    /// Remove a book from the shelf.
    ///
    /// A detail view of the removed book is closed back to the shelf.
    /// Stored reading progress is kept; only [`reset_progress`] clears it.
    ///
    /// [`reset_progress`]: NavigationController::reset_progress
    pub fn remove_from_shelf(&self, id: &BookId) -> Result<bool> {
        let removed = self.library.remove(id)?;
        if removed {
            self.emit(ReaderEvent::Shelf(ShelfEvent::BookRemoved {
                book_id: id.clone().into_string(),
            }));
            self.apply(NavEvent::ShelfBookRemoved { id: id.clone() });
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Detail and reading
    // ------------------------------------------------------------------

    /// Fetch metadata and the table of contents for the focused book.
    ///
    /// Valid in Detail and Reader views. When the book is on the shelf, the
    /// stored record is refreshed from the fetched metadata.
    #[instrument(skip(self))]
    pub async fn load_detail(&self) -> Result<BookDetail> {
        let book_id = {
            let state = self.lock_state();
            state
                .book()
                .map(|b| b.id.clone())
                .ok_or_else(|| ReaderError::State("no book selected".to_string()))?
        };

        self.emit(ReaderEvent::Fetch(FetchEvent::Started {
            resource: "detail".to_string(),
            key: book_id.to_string(),
        }));

        let detail = match self.detail.request(book_id.clone()).await {
            Ok(detail) => detail,
            Err(e) => {
                self.emit(ReaderEvent::Fetch(FetchEvent::Failed {
                    resource: "detail".to_string(),
                    key: book_id.to_string(),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }));
                return Err(e.into());
            }
        };

        self.emit(ReaderEvent::Fetch(FetchEvent::Completed {
            resource: "detail".to_string(),
            key: book_id.to_string(),
        }));

        if self.library.update(&book_id, detail.shelf_patch())? {
            self.emit(ReaderEvent::Shelf(ShelfEvent::MetadataRefreshed {
                book_id: book_id.into_string(),
                total_chapters: detail.total_chapters,
            }));
        }

        Ok(detail)
    }

    /// Begin a reading session for the book in the detail view.
    ///
    /// Resumes at the chapter stored in reading progress when it still
    /// exists in the table of contents, otherwise starts at the first
    /// chapter. Returns the sanitized content of the entered chapter.
    #[instrument(skip(self))]
    pub async fn start_reading(&self) -> Result<ChapterContent> {
        {
            let state = self.lock_state();
            if !matches!(&*state, ViewState::Detail { .. }) {
                return Err(ReaderError::State(format!(
                    "cannot start reading from the {} view",
                    state.label()
                )));
            }
        }

        let detail = self.load_detail().await?;
        if detail.chapters.is_empty() {
            return Err(ReaderError::State("book has no chapters".to_string()));
        }

        let resume_index = self
            .progress
            .get(&detail.book_id)
            .and_then(|p| {
                detail
                    .chapters
                    .iter()
                    .position(|c| c.id == p.current_chapter_id)
            })
            .unwrap_or(0);

        let outcome = self.apply(NavEvent::StartReading {
            chapters: detail.chapters.clone(),
            index: resume_index,
        });
        let entered = outcome
            .entered_chapter
            .ok_or_else(|| ReaderError::State("reading session did not open".to_string()))?;

        self.record_chapter_entry(&detail.book_id, &detail.chapters, entered)?;
        self.fetch_chapter(&detail.chapters[entered]).await
    }

    /// Jump to a chapter by index within the open session.
    ///
    /// Returns `None` when the index is out of range; the session is left
    /// where it was and a boundary event is emitted.
    pub async fn set_chapter(&self, index: usize) -> Result<Option<ChapterContent>> {
        self.navigate_chapter(NavEvent::SetChapter(index)).await
    }

    /// Advance one chapter. `None` at the end of the book.
    pub async fn next_chapter(&self) -> Result<Option<ChapterContent>> {
        self.navigate_chapter(NavEvent::NextChapter).await
    }

    /// Go back one chapter. `None` at the start of the book.
    pub async fn previous_chapter(&self) -> Result<Option<ChapterContent>> {
        self.navigate_chapter(NavEvent::PrevChapter).await
    }

    /// Sanitized content of the current Reader chapter.
    pub async fn current_chapter_content(&self) -> Result<ChapterContent> {
        let chapter = {
            let state = self.lock_state();
            match &*state {
                ViewState::Reader {
                    chapters,
                    current_index,
                    ..
                } => chapters[*current_index].clone(),
                other => {
                    return Err(ReaderError::State(format!(
                        "no open reading session in the {} view",
                        other.label()
                    )))
                }
            }
        };
        self.fetch_chapter(&chapter).await
    }

    // ------------------------------------------------------------------
    // Settings and progress passthroughs
    // ------------------------------------------------------------------

    /// Current display settings, merged over defaults.
    pub fn display_settings(&self) -> DisplaySettings {
        self.settings.get()
    }

    /// Apply a partial settings update. Out-of-range values are clamped.
    pub fn update_settings(&self, patch: &DisplaySettingsPatch) -> Result<DisplaySettings> {
        let updated = self.settings.update(patch)?;
        self.emit(ReaderEvent::View(ViewEvent::SettingsUpdated));
        Ok(updated)
    }

    /// Stored reading progress for a book, if any.
    pub fn progress_for(&self, book_id: &BookId) -> Option<ReadingProgress> {
        self.progress.get(book_id)
    }

    /// Explicitly clear stored progress for one book.
    pub fn reset_progress(&self, book_id: &BookId) -> Result<bool> {
        let removed = self.progress.reset_for(book_id)?;
        if removed {
            self.emit(ReaderEvent::Reading(ReadingEvent::ProgressReset {
                book_id: book_id.clone().into_string(),
            }));
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn navigate_chapter(&self, event: NavEvent) -> Result<Option<ChapterContent>> {
        let outcome = self.apply(event);

        // apply() already emitted the boundary event for rejected moves.
        let Some(entered) = outcome.entered_chapter else {
            return Ok(None);
        };

        let (book_id, chapters) = match outcome.state {
            ViewState::Reader { book, chapters, .. } => (book.id, chapters),
            _ => return Ok(None),
        };

        self.record_chapter_entry(&book_id, &chapters, entered)?;
        let content = self.fetch_chapter(&chapters[entered]).await?;
        Ok(Some(content))
    }

    /// Persist progress for an entered chapter and announce it.
    fn record_chapter_entry(
        &self,
        book_id: &BookId,
        chapters: &[ChapterRef],
        index: usize,
    ) -> Result<()> {
        let chapter = &chapters[index];
        let total_progress = (index + 1) as f32 / chapters.len() as f32 * 100.0;

        self.progress.save(ReadingProgress {
            book_id: book_id.clone(),
            current_chapter_id: chapter.id.clone(),
            current_chapter_progress: 0.0,
            total_progress,
            last_read_at: Utc::now().timestamp(),
        })?;

        self.emit(ReaderEvent::Reading(ReadingEvent::ChapterEntered {
            book_id: book_id.clone().into_string(),
            chapter_id: chapter.id.clone(),
            index,
            total_progress,
        }));
        Ok(())
    }

    async fn fetch_chapter(&self, chapter: &ChapterRef) -> Result<ChapterContent> {
        let key = chapter.source_locator.clone();
        self.emit(ReaderEvent::Fetch(FetchEvent::Started {
            resource: "chapter".to_string(),
            key: key.clone(),
        }));

        match self.content.request(key.clone()).await {
            Ok(content) => {
                self.emit(ReaderEvent::Fetch(FetchEvent::Completed {
                    resource: "chapter".to_string(),
                    key,
                }));
                Ok(content)
            }
            Err(e) => {
                self.emit(ReaderEvent::Fetch(FetchEvent::Failed {
                    resource: "chapter".to_string(),
                    key,
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }));
                Err(e.into())
            }
        }
    }

    /// Run one transition, store the new view, and emit the consequences.
    fn apply(&self, event: NavEvent) -> Step {
        let mut state = self.lock_state();
        let before = state.clone();
        let outcome = step(before.clone(), event);
        *state = outcome.state.clone();
        drop(state);

        if outcome.state != before {
            self.emit(ReaderEvent::View(ViewEvent::Changed {
                view: outcome.state.label().to_string(),
            }));
        }

        if let Some(signal) = outcome.signal {
            if let Some(book) = outcome.state.book() {
                let boundary = match signal {
                    NavSignal::FirstChapterReached => ChapterBoundary::First,
                    NavSignal::LastChapterReached => ChapterBoundary::Last,
                };
                self.emit(ReaderEvent::Reading(ReadingEvent::BoundaryReached {
                    book_id: book.id.clone().into_string(),
                    boundary,
                }));
            }
        }

        outcome
    }

    fn emit(&self, event: ReaderEvent) {
        // No subscribers is not an error.
        let _ = self.events.emit(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}
