// Edit lifecycle of one hotel: load, edit, save or delete, then navigate away.
// Every transition goes through a single tagged `EditState`; the form, the
// cached record and the state live together behind one lock that is never
// held across an await.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::api::{ApiError, HotelApi};
use crate::detail_view::{not_found_links, write_not_found};
use crate::hotel::{HotelId, HotelPatch, HotelRecord};
use crate::lifecycle::Mount;
use crate::routes::{Link, Route};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this hotel? This action cannot be undone.";

const SAVED_MESSAGE: &str = "Hotel updated successfully. Redirecting...";
const DELETED_MESSAGE: &str = "Hotel deleted.";

#[derive(Debug, Clone)]
pub struct EditConfig {
    /// Pause between a successful save and the redirect to the detail page.
    pub redirect_delay_ms: u64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            redirect_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Address,
    NumberOfRooms,
    Description,
    Rating,
    PriceRange,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Title,
        Field::Address,
        Field::NumberOfRooms,
        Field::Description,
        Field::Rating,
        Field::PriceRange,
    ];

    pub const REQUIRED: [Field; 3] = [Field::Title, Field::Address, Field::NumberOfRooms];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Hotel name",
            Field::Address => "Address",
            Field::NumberOfRooms => "Number of rooms",
            Field::Description => "Description",
            Field::Rating => "Rating (0-5)",
            Field::PriceRange => "Price range",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Required fields are missing: {}", labels(.0))]
    MissingFields(Vec<Field>),

    #[error("Rating must be a number between 0 and 5, got {0:?}")]
    InvalidRating(String),
}

fn labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text values of the edit form, one per editable field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditForm {
    pub title: String,
    pub address: String,
    pub number_of_rooms: String,
    pub description: String,
    pub rating: String,
    pub price_range: String,
}

impl EditForm {
    pub fn from_record(hotel: &HotelRecord) -> Self {
        Self {
            title: hotel.title.clone(),
            address: hotel.address.clone(),
            number_of_rooms: hotel.number_of_rooms.clone(),
            description: hotel.description.clone().unwrap_or_default(),
            rating: hotel.rating.map(|r| r.to_string()).unwrap_or_default(),
            price_range: hotel.price_range.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Address => &self.address,
            Field::NumberOfRooms => &self.number_of_rooms,
            Field::Description => &self.description,
            Field::Rating => &self.rating,
            Field::PriceRange => &self.price_range,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Address => &mut self.address,
            Field::NumberOfRooms => &mut self.number_of_rooms,
            Field::Description => &mut self.description,
            Field::Rating => &mut self.rating,
            Field::PriceRange => &mut self.price_range,
        };
        *slot = value.into();
    }

    /// Checks the required fields and coerces the rating, producing the full
    /// replacement of the editable fields. A blank rating is left out.
    pub fn validate(&self) -> Result<HotelPatch, FormError> {
        let missing: Vec<Field> = Field::REQUIRED
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        let rating = match self.rating.trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(value) if (0.0..=5.0).contains(&value) => Some(value),
                _ => return Err(FormError::InvalidRating(self.rating.clone())),
            },
        };

        Ok(HotelPatch {
            title: Some(self.title.clone()),
            address: Some(self.address.clone()),
            number_of_rooms: Some(self.number_of_rooms.clone()),
            description: Some(self.description.clone()),
            rating,
            price_range: Some(self.price_range.clone()),
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditState {
    Loading,
    Ready { alert: Option<EditError> },
    Saving,
    Deleting,
    Success,
    Deleted,
    Failed { error: EditError },
    NotFound,
}

impl EditState {
    /// A write is in flight; save and delete are disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self, EditState::Saving | EditState::Deleting)
    }

    // Same state, now reporting `error`
    fn with_error(self, error: EditError) -> Self {
        match self {
            EditState::Ready { .. } => EditState::Ready { alert: Some(error) },
            EditState::Failed { .. } => EditState::Failed { error },
            other => other,
        }
    }
}

/// Explicit user confirmation for destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

struct Inner {
    state: EditState,
    record: Option<HotelRecord>,
    form: EditForm,
    loaded_at: Option<DateTime<Utc>>,
}

impl Inner {
    // Ready, or Failed after a record was loaded
    fn accepts_input(&self) -> bool {
        match self.state {
            EditState::Ready { .. } => true,
            EditState::Failed { .. } => self.record.is_some(),
            _ => false,
        }
    }
}

pub struct HotelEditController {
    api: Arc<dyn HotelApi>,
    id: HotelId,
    config: EditConfig,
    confirm: Arc<dyn Confirm>,
    navigator: UnboundedSender<Route>,
    mount: Mount,
    load_started: AtomicBool,
    inner: Mutex<Inner>,
}

impl HotelEditController {
    pub fn new(
        api: Arc<dyn HotelApi>,
        id: HotelId,
        navigator: UnboundedSender<Route>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            id,
            config: EditConfig::default(),
            confirm,
            navigator,
            mount: Mount::new(),
            load_started: AtomicBool::new(false),
            inner: Mutex::new(Inner {
                state: EditState::Loading,
                record: None,
                form: EditForm::default(),
                loaded_at: None,
            }),
        }
    }

    pub fn with_config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> HotelId {
        self.id
    }

    pub fn state(&self) -> EditState {
        self.inner.lock().state.clone()
    }

    pub fn form(&self) -> EditForm {
        self.inner.lock().form.clone()
    }

    pub fn record(&self) -> Option<HotelRecord> {
        self.inner.lock().record.clone()
    }

    /// Fetches the hotel and pre-populates the form. Runs once per controller.
    pub async fn load(&self) {
        if self.load_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(result) = self.mount.run(self.api.get(self.id)).await else {
            return;
        };

        let mut inner = self.inner.lock();
        match result {
            Ok(hotel) => {
                inner.form = EditForm::from_record(&hotel);
                inner.record = Some(hotel);
                inner.loaded_at = Some(Utc::now());
                inner.state = EditState::Ready { alert: None };
            }
            Err(ApiError::NotFound(id)) => {
                debug!(%id, "hotel to edit does not exist");
                inner.state = EditState::NotFound;
            }
            Err(error) => {
                warn!(id = %self.id, %error, "failed to load hotel for editing");
                inner.state = EditState::Failed {
                    error: error.into(),
                };
            }
        }
    }

    /// Updates one form field. Ignored while the form is not editable.
    pub fn set_field(&self, field: Field, value: impl Into<String>) -> bool {
        let mut inner = self.inner.lock();
        if !inner.accepts_input() {
            return false;
        }
        inner.form.set(field, value);
        true
    }

    /// Clears the reported error so the user can retry from a clean form.
    pub fn dismiss(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            EditState::Ready { .. } => inner.state = EditState::Ready { alert: None },
            EditState::Failed { .. } if inner.record.is_some() => {
                inner.state = EditState::Ready { alert: None }
            }
            _ => {}
        }
    }

    pub async fn save(&self) {
        let patch = {
            let mut inner = self.inner.lock();
            if !inner.accepts_input() {
                debug!(id = %self.id, state = ?inner.state, "save ignored");
                return;
            }
            match inner.form.validate() {
                Ok(patch) => {
                    inner.state = EditState::Saving;
                    patch
                }
                Err(error) => {
                    let state = std::mem::replace(&mut inner.state, EditState::Saving);
                    inner.state = state.with_error(error.into());
                    return;
                }
            }
        };

        let Some(result) = self.mount.run(self.api.update(self.id, &patch)).await else {
            return;
        };

        let mut inner = self.inner.lock();
        match result {
            Ok(hotel) => {
                info!(id = %self.id, "hotel saved");
                inner.record = Some(hotel);
                inner.loaded_at = Some(Utc::now());
                inner.state = EditState::Success;
                drop(inner);
                self.redirect_after_save();
            }
            Err(error) => {
                warn!(id = %self.id, %error, "failed to save hotel");
                inner.state = EditState::Failed {
                    error: error.into(),
                };
            }
        }
    }

    fn redirect_after_save(&self) {
        let navigator = self.navigator.clone();
        let route = Route::HotelDetail(self.id);
        let delay = Duration::from_millis(self.config.redirect_delay_ms);
        self.mount.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = navigator.send(route);
        });
    }

    /// Deletes the hotel after the user confirms, then returns to the list.
    pub async fn delete(&self) {
        if !self.inner.lock().accepts_input() {
            debug!(id = %self.id, "delete ignored");
            return;
        }
        if !self.confirm.confirm(DELETE_PROMPT) {
            return;
        }

        let previous = {
            let mut inner = self.inner.lock();
            // the state may have moved on while the prompt was open
            if !inner.accepts_input() {
                return;
            }
            std::mem::replace(&mut inner.state, EditState::Deleting)
        };

        let Some(result) = self.mount.run(self.api.delete(self.id)).await else {
            return;
        };

        let mut inner = self.inner.lock();
        match result {
            Ok(()) => {
                info!(id = %self.id, "hotel deleted");
                inner.state = EditState::Deleted;
                drop(inner);
                let _ = self.navigator.send(Route::HotelList);
            }
            Err(error) => {
                warn!(id = %self.id, %error, "failed to delete hotel");
                inner.state = previous.with_error(error.into());
            }
        }
    }

    /// Drops interest in outstanding requests and cancels a pending redirect.
    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn page(&self) -> EditPage {
        let inner = self.inner.lock();
        let (alert, locked) = match &inner.state {
            EditState::Loading => return EditPage::Loading,
            EditState::NotFound => {
                return EditPage::NotFound {
                    links: not_found_links(),
                }
            }
            EditState::Failed { error } if inner.record.is_none() => {
                return EditPage::LoadError {
                    message: error.to_string(),
                    back: Link::new("Back to list", Route::HotelList),
                }
            }
            EditState::Ready { alert } => (alert.as_ref().map(Alert::error), false),
            EditState::Failed { error } => (Some(Alert::error(error)), false),
            EditState::Saving | EditState::Deleting => (None, true),
            EditState::Success => (Some(Alert::Success(SAVED_MESSAGE)), true),
            EditState::Deleted => (Some(Alert::Success(DELETED_MESSAGE)), true),
        };

        EditPage::Form(EditFormPage {
            id: self.id,
            hotel_title: inner
                .record
                .as_ref()
                .map(|hotel| hotel.title.clone())
                .unwrap_or_default(),
            form: inner.form.clone(),
            alert,
            saving: inner.state == EditState::Saving,
            save_enabled: !locked,
            delete_enabled: !locked,
            cancel: Link::new("Cancel", Route::HotelDetail(self.id)),
            last_updated: inner.loaded_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success(&'static str),
    Error(String),
}

impl Alert {
    fn error(error: &EditError) -> Self {
        Alert::Error(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditFormPage {
    pub id: HotelId,
    pub hotel_title: String,
    pub form: EditForm,
    pub alert: Option<Alert>,
    pub saving: bool,
    pub save_enabled: bool,
    pub delete_enabled: bool,
    pub cancel: Link,
    pub last_updated: Option<DateTime<Utc>>,
}

// Render model of the edit page
#[derive(Debug, Clone, PartialEq)]
pub enum EditPage {
    Loading,
    NotFound { links: Vec<Link> },
    LoadError { message: String, back: Link },
    Form(EditFormPage),
}

impl fmt::Display for EditFormPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Edit hotel")?;
        writeln!(f, "{} - ID: {} {}", self.hotel_title, self.id, self.cancel)?;
        match &self.alert {
            Some(Alert::Success(message)) => writeln!(f, "Success! {message}")?,
            Some(Alert::Error(message)) => writeln!(f, "Error: {message}")?,
            None => {}
        }
        for field in Field::ALL {
            let marker = if field.is_required() { " *" } else { "" };
            writeln!(f, "{}{}: {}", field.label(), marker, self.form.get(field))?;
        }
        let save = if self.saving { "Saving..." } else { "Save changes" };
        let disabled = |enabled: bool| if enabled { "" } else { " (disabled)" };
        writeln!(f, "[{save}]{}", disabled(self.save_enabled))?;
        writeln!(f, "[Delete hotel]{}", disabled(self.delete_enabled))?;
        if let Some(last_updated) = self.last_updated {
            writeln!(f, "Last updated: {}", last_updated.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}

impl fmt::Display for EditPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditPage::Loading => writeln!(f, "Loading hotel..."),
            EditPage::NotFound { links } => write_not_found(f, links),
            EditPage::LoadError { message, back } => {
                writeln!(f, "Error: {message}")?;
                writeln!(f, "{back}")
            }
            EditPage::Form(page) => write!(f, "{page}"),
        }
    }
}
