// Hotel list page: fetches every hotel on mount and renders them as a table

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiError, HotelApi};
use crate::hotel::{HotelId, HotelRecord};
use crate::lifecycle::Mount;
use crate::routes::{Link, Route};

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Loaded(Vec<HotelRecord>),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub id: HotelId,
    pub title: String,
    pub address: String,
    pub rooms: String,
    pub link: Route,
}

// Render model of the list page
#[derive(Debug, Clone, PartialEq)]
pub enum ListPage {
    Loading,
    Empty {
        message: &'static str,
        hint: &'static str,
        create: Link,
    },
    Table {
        caption: String,
        rows: Vec<ListRow>,
        create: Link,
    },
    Error {
        message: String,
        back: Link,
    },
}

const CREATE: Link = Link::new("New hotel", Route::NewHotel);

impl ListPage {
    pub fn from_records(hotels: &[HotelRecord]) -> Self {
        if hotels.is_empty() {
            return ListPage::Empty {
                message: "No hotels found",
                hint: "Start by registering your first hotel",
                create: Link::new("Register hotel", Route::NewHotel),
            };
        }

        let caption = match hotels.len() {
            1 => "1 hotel registered".to_string(),
            n => format!("{n} hotels registered"),
        };
        let rows = hotels
            .iter()
            .map(|hotel| ListRow {
                id: hotel.id,
                title: hotel.title.clone(),
                address: hotel.address.clone(),
                rooms: hotel.number_of_rooms.clone(),
                link: Route::HotelDetail(hotel.id),
            })
            .collect();

        ListPage::Table {
            caption,
            rows,
            create: CREATE,
        }
    }

    pub fn from_state(state: &ListState) -> Self {
        match state {
            ListState::Loading => ListPage::Loading,
            ListState::Loaded(hotels) => Self::from_records(hotels),
            ListState::Failed(error) => ListPage::Error {
                message: error.to_string(),
                back: Link::new("Home", Route::Home),
            },
        }
    }

    pub fn rows(&self) -> &[ListRow] {
        match self {
            ListPage::Table { rows, .. } => rows,
            _ => &[],
        }
    }
}

impl fmt::Display for ListPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPage::Loading => writeln!(f, "Loading hotels..."),
            ListPage::Error { message, back } => {
                writeln!(f, "Error: {message}")?;
                writeln!(f, "{back}")
            }
            ListPage::Empty {
                message,
                hint,
                create,
            } => {
                writeln!(f, "Hotels")?;
                writeln!(f, "{message}")?;
                writeln!(f, "{hint}")?;
                writeln!(f, "{create}")
            }
            ListPage::Table {
                caption,
                rows,
                create,
            } => {
                writeln!(f, "Hotels {create}")?;
                writeln!(f, "{:<8} | {:<32} | {:<40} | {:>6}", "ID", "Name", "Address", "Rooms")?;
                for row in rows {
                    writeln!(
                        f,
                        "{:<8} | {:<32} | {:<40} | {:>6}",
                        row.id, row.title, row.address, row.rooms
                    )?;
                }
                writeln!(f, "{caption}")
            }
        }
    }
}

pub struct HotelListView {
    api: Arc<dyn HotelApi>,
    mount: Mount,
    started: AtomicBool,
    state: Mutex<ListState>,
}

impl HotelListView {
    pub fn new(api: Arc<dyn HotelApi>) -> Self {
        Self {
            api,
            mount: Mount::new(),
            started: AtomicBool::new(false),
            state: Mutex::new(ListState::Loading),
        }
    }

    /// Fetches the hotel list. Only the first call issues a request.
    pub async fn mount(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(result) = self.mount.run(self.api.list()).await else {
            debug!("hotel list unmounted before the response arrived");
            return;
        };
        *self.state.lock() = match result {
            Ok(hotels) => ListState::Loaded(hotels),
            Err(error) => ListState::Failed(error),
        };
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn state(&self) -> ListState {
        self.state.lock().clone()
    }

    pub fn page(&self) -> ListPage {
        ListPage::from_state(&self.state.lock())
    }
}
