// Hotel detail page: fetches one hotel on mount and renders its fields

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiError, HotelApi};
use crate::hotel::{HotelId, HotelRecord};
use crate::lifecycle::Mount;
use crate::routes::{Link, Route};

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(HotelRecord),
    NotFound(HotelId),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingSection {
    pub value: f64,
    /// Stars lit out of [`MAX_STARS`].
    pub filled_stars: u8,
}

impl RatingSection {
    pub fn new(value: f64) -> Self {
        let filled_stars = value.ceil().clamp(0.0, f64::from(MAX_STARS)) as u8;
        Self {
            value,
            filled_stars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelDetail {
    pub id: HotelId,
    pub title: String,
    pub address: String,
    pub rooms: String,
    pub description: Option<String>,
    pub rating: Option<RatingSection>,
    pub price_range: Option<String>,
    pub actions: Vec<Link>,
}

impl From<&HotelRecord> for HotelDetail {
    fn from(hotel: &HotelRecord) -> Self {
        Self {
            id: hotel.id,
            title: hotel.title.clone(),
            address: hotel.address.clone(),
            rooms: hotel.number_of_rooms.clone(),
            description: hotel.description.clone().filter(|d| !d.is_empty()),
            rating: hotel.rating.map(RatingSection::new),
            price_range: hotel.price_range.clone().filter(|p| !p.is_empty()),
            actions: vec![
                Link::new("Edit hotel", Route::EditHotel(hotel.id)),
                Link::new("View rooms", Route::HotelRooms(hotel.id)),
                Link::new("Back to list", Route::HotelList),
            ],
        }
    }
}

// Render model of the detail page
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPage {
    Loading,
    Hotel(HotelDetail),
    NotFound { links: Vec<Link> },
    Error { message: String, back: Link },
}

impl DetailPage {
    pub fn from_state(state: &DetailState) -> Self {
        match state {
            DetailState::Loading => DetailPage::Loading,
            DetailState::Loaded(hotel) => DetailPage::Hotel(hotel.into()),
            DetailState::NotFound(_) => DetailPage::NotFound {
                links: not_found_links(),
            },
            DetailState::Failed(error) => DetailPage::Error {
                message: error.to_string(),
                back: Link::new("Back to list", Route::HotelList),
            },
        }
    }

    /// Document title of the page.
    pub fn title(&self) -> String {
        match self {
            DetailPage::Hotel(hotel) => format!("{} - Hotel details", hotel.title),
            DetailPage::NotFound { .. } => "Hotel not found".to_string(),
            DetailPage::Loading | DetailPage::Error { .. } => "Hotel details".to_string(),
        }
    }
}

pub(crate) fn not_found_links() -> Vec<Link> {
    vec![
        Link::new("See all hotels", Route::HotelList),
        Link::new("Home", Route::Home),
    ]
}

pub(crate) fn write_not_found(f: &mut fmt::Formatter<'_>, links: &[Link]) -> fmt::Result {
    writeln!(f, "Hotel not found")?;
    writeln!(
        f,
        "The hotel you are looking for does not exist or has been removed."
    )?;
    for link in links {
        writeln!(f, "{link}")?;
    }
    Ok(())
}

impl fmt::Display for HotelDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "Rooms: {}", self.rooms)?;
        if let Some(description) = &self.description {
            writeln!(f, "Description: {description}")?;
        }
        if let Some(rating) = &self.rating {
            let stars: String = (0..MAX_STARS)
                .map(|i| if i < rating.filled_stars { '★' } else { '☆' })
                .collect();
            writeln!(f, "Rating: {stars} {:.1}", rating.value)?;
        }
        if let Some(price_range) = &self.price_range {
            writeln!(f, "Price range: {price_range}")?;
        }
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DetailPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailPage::Loading => writeln!(f, "Loading hotel..."),
            DetailPage::Hotel(hotel) => write!(f, "{hotel}"),
            DetailPage::NotFound { links } => write_not_found(f, links),
            DetailPage::Error { message, back } => {
                writeln!(f, "Error: {message}")?;
                writeln!(f, "{back}")
            }
        }
    }
}

pub struct HotelDetailView {
    api: Arc<dyn HotelApi>,
    id: HotelId,
    mount: Mount,
    started: AtomicBool,
    state: Mutex<DetailState>,
}

impl HotelDetailView {
    pub fn new(api: Arc<dyn HotelApi>, id: HotelId) -> Self {
        Self {
            api,
            id,
            mount: Mount::new(),
            started: AtomicBool::new(false),
            state: Mutex::new(DetailState::Loading),
        }
    }

    pub fn id(&self) -> HotelId {
        self.id
    }

    pub async fn mount(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(result) = self.mount.run(self.api.get(self.id)).await else {
            debug!(id = %self.id, "hotel detail unmounted before the response arrived");
            return;
        };
        *self.state.lock() = match result {
            Ok(hotel) => DetailState::Loaded(hotel),
            Err(ApiError::NotFound(id)) => DetailState::NotFound(id),
            Err(error) => DetailState::Failed(error),
        };
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn state(&self) -> DetailState {
        self.state.lock().clone()
    }

    pub fn page(&self) -> DetailPage {
        DetailPage::from_state(&self.state.lock())
    }
}
