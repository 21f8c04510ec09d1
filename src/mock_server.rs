// In-memory stand-in for the remote hotel API, used by the tests

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::hotel::{HotelId, HotelRecord};

pub fn hotel(id: u64, title: &str, address: &str, rooms: &str) -> HotelRecord {
    HotelRecord {
        id: HotelId(id),
        title: title.to_string(),
        address: address.to_string(),
        number_of_rooms: rooms.to_string(),
        description: None,
        rating: None,
        price_range: None,
        amenities: None,
    }
}

#[derive(Default)]
pub struct MockServer {
    hotels: Mutex<BTreeMap<HotelId, HotelRecord>>,
    scripted: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
    outage: AtomicBool,
    delay_ms: AtomicU64,
    list_count: AtomicUsize,
    get_count: AtomicUsize,
    update_count: AtomicUsize,
    delete_count: AtomicUsize,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hotels(hotels: Vec<HotelRecord>) -> Self {
        let server = Self::new();
        server
            .hotels
            .lock()
            .extend(hotels.into_iter().map(|h| (h.id, h)));
        server
    }

    pub fn hotel(&self, id: u64) -> Option<HotelRecord> {
        self.hotels.lock().get(&HotelId(id)).cloned()
    }

    /// Answers the next request with the given status and raw body instead
    /// of consulting the stored hotels.
    pub fn respond_next_with(&self, status: u16, body: &str) {
        self.scripted.lock().push_back(ApiResponse {
            status,
            body: Bytes::from(body.to_string()),
        });
    }

    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    fn count(&self, request: &ApiRequest) {
        let is_collection = request.path.trim_end_matches('/').ends_with("/hotels");
        let counter = match (request.method.as_str(), is_collection) {
            ("GET", true) => &self.list_count,
            ("GET", false) => &self.get_count,
            ("PUT", _) => &self.update_count,
            ("DELETE", _) => &self.delete_count,
            _ => return,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn respond(&self, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        let id = match segments.as_slice() {
            ["api", "hotels"] => None,
            ["api", "hotels", id] => match id.parse::<HotelId>() {
                Ok(id) => Some(id),
                Err(_) => return reply(400, json!({"success": false, "message": "Invalid id"})),
            },
            _ => return reply(404, json!({"success": false, "message": "Unknown route"})),
        };

        match (request.method.as_str(), id) {
            ("GET", None) => {
                let hotels: Vec<HotelRecord> = self.hotels.lock().values().cloned().collect();
                reply(200, json!({"success": true, "data": hotels}))
            }
            ("GET", Some(id)) => match self.hotels.lock().get(&id) {
                Some(hotel) => reply(200, json!({"success": true, "data": hotel})),
                None => not_found(),
            },
            ("PUT", Some(id)) => self.apply_update(id, request.body.clone().unwrap_or_default()),
            ("DELETE", Some(id)) => match self.hotels.lock().remove(&id) {
                Some(_) => reply(200, json!({"success": true, "message": "Hotel deleted"})),
                None => not_found(),
            },
            _ => reply(405, json!({"success": false, "message": "Method not allowed"})),
        }
    }

    fn apply_update(&self, id: HotelId, body: serde_json::Value) -> ApiResponse {
        let mut hotels = self.hotels.lock();
        let Some(hotel) = hotels.get_mut(&id) else {
            return not_found();
        };

        let text = |field: &str| body.get(field).and_then(|v| v.as_str()).map(str::to_string);
        if text("title").is_some_and(|t| t.is_empty()) {
            return reply(422, json!({"success": false, "message": "Title is required"}));
        }

        if let Some(title) = text("title") {
            hotel.title = title;
        }
        if let Some(address) = text("address") {
            hotel.address = address;
        }
        if let Some(rooms) = text("numberOfRooms") {
            hotel.number_of_rooms = rooms;
        }
        if let Some(description) = text("description") {
            hotel.description = Some(description);
        }
        if let Some(price_range) = text("priceRange") {
            hotel.price_range = Some(price_range);
        }
        if let Some(rating) = body.get("rating").and_then(|v| v.as_f64()) {
            hotel.rating = Some(rating);
        }

        reply(200, json!({"success": true, "data": hotel}))
    }
}

fn reply(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse {
        status,
        body: Bytes::from(body.to_string()),
    }
}

fn not_found() -> ApiResponse {
    reply(404, json!({"success": false, "message": "Hotel not found"}))
}

#[async_trait]
impl Transport for MockServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests.lock().push(request.clone());
        self.count(&request);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.outage.load(Ordering::SeqCst) {
            return Err(ApiError::NetworkError("Service unavailable".to_string()));
        }

        if let Some(response) = self.scripted.lock().pop_front() {
            return Ok(response);
        }

        Ok(self.respond(&request))
    }
}
