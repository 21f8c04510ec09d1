// Admin client for hotel records: remote API access plus the list, detail
// and edit screens built on top of it

pub mod api;
pub mod detail_view;
pub mod edit_controller;
pub mod hotel;
pub mod lifecycle;
pub mod list_view;
pub mod routes;

#[cfg(test)]
mod mock_server;

// Re-export key types for convenience
pub use api::{
    ApiError, ApiRequest, ApiResponse, ClientConfig, ClientError, HotelApi, HotelApiClient,
    HttpTransport, Transport,
};
pub use detail_view::{DetailPage, DetailState, HotelDetailView};
pub use edit_controller::{
    Confirm, EditConfig, EditError, EditForm, EditPage, EditState, Field, FormError,
    HotelEditController,
};
pub use hotel::{HotelId, HotelPatch, HotelRecord};
pub use list_view::{HotelListView, ListPage, ListState};
pub use routes::{Link, Route};
