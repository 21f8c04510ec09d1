// Navigation targets of the admin interface

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::hotel::HotelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    HotelList,
    NewHotel,
    HotelDetail(HotelId),
    EditHotel(HotelId),
    HotelRooms(HotelId),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("No route matches {0:?}")]
pub struct UnknownRoute(pub String);

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::HotelList => "/admin/hotels".to_string(),
            Route::NewHotel => "/admin/hotels/new".to_string(),
            Route::HotelDetail(id) => format!("/admin/hotels/{id}"),
            Route::EditHotel(id) => format!("/admin/hotels/{id}/edit"),
            Route::HotelRooms(id) => format!("/admin/hotels/{id}/rooms"),
        }
    }

    pub fn parse(path: &str) -> Result<Self, UnknownRoute> {
        let unknown = || UnknownRoute(path.to_string());
        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Route::Home);
        }

        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["admin", "hotels"] => Ok(Route::HotelList),
            ["admin", "hotels", "new"] => Ok(Route::NewHotel),
            ["admin", "hotels", id] => id.parse().map(Route::HotelDetail).map_err(|_| unknown()),
            ["admin", "hotels", id, "edit"] => {
                id.parse().map(Route::EditHotel).map_err(|_| unknown())
            }
            ["admin", "hotels", id, "rooms"] => {
                id.parse().map(Route::HotelRooms).map_err(|_| unknown())
            }
            _ => Err(unknown()),
        }
    }
}

/// A labelled navigation target rendered as a button or link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: &'static str,
    pub route: Route,
}

impl Link {
    pub const fn new(label: &'static str, route: Route) -> Self {
        Self { label, route }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]({})", self.label, self.route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}
