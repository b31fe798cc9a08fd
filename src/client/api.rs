//! Domain operations over the resilient client.
//!
//! Each operation shapes one request and returns the parsed payload, or the
//! classified error unchanged.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::objects::ObjectType;
use crate::client::{Endpoint, ResilientClient, TripItError, TripItResult};
use crate::oauth::signer::percent_encode;
use crate::oauth::CredentialPair;

pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Filters for `/list/trip`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListTripsQuery {
    pub past: bool,
    pub modified_since: Option<String>,
    pub include_objects: bool,
    pub traveler: Option<String>,
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for ListTripsQuery {
    fn default() -> Self {
        Self {
            past: false,
            modified_since: None,
            include_objects: false,
            traveler: None,
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filters for `/list/{type}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListObjectsQuery {
    pub trip_id: Option<String>,
    pub past: bool,
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for ListObjectsQuery {
    fn default() -> Self {
        Self {
            trip_id: None,
            past: false,
            page_num: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Free-text trip search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchTripsQuery {
    pub query: String,
    #[serde(default)]
    pub past: bool,
    #[serde(default = "first_page")]
    pub page_num: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// One flight segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlightDetails {
    pub trip_id: Option<String>,
    pub airline_code: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_date: String,
    pub departure_time: Option<String>,
    pub arrival_date: Option<String>,
    pub arrival_time: Option<String>,
    pub confirmation_number: Option<String>,
    pub seat: Option<String>,
}

impl FlightDetails {
    fn into_payload(self) -> (Option<String>, Value) {
        let mut segment = Map::new();
        segment.insert("StartDateTime".into(), date_time(&self.departure_date, self.departure_time.as_deref()));
        segment.insert("start_airport_code".into(), json!(self.departure_airport));
        segment.insert("end_airport_code".into(), json!(self.arrival_airport));
        segment.insert("marketing_airline".into(), json!(self.airline_code));
        segment.insert("marketing_flight_number".into(), json!(self.flight_number));
        if let Some(date) = self.arrival_date.as_deref() {
            segment.insert("EndDateTime".into(), date_time(date, self.arrival_time.as_deref()));
        }
        insert_opt(&mut segment, "seats", self.seat);

        let mut air = Map::new();
        air.insert("Segment".into(), Value::Object(segment));
        insert_opt(&mut air, "supplier_conf_num", self.confirmation_number);

        (self.trip_id, Value::Object(air))
    }
}

/// One hotel stay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HotelDetails {
    pub trip_id: Option<String>,
    pub hotel_name: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub address: Option<String>,
    pub confirmation_number: Option<String>,
    pub number_guests: Option<u32>,
}

impl HotelDetails {
    fn into_payload(self) -> (Option<String>, Value) {
        let mut lodging = Map::new();
        lodging.insert("supplier_name".into(), json!(self.hotel_name));
        lodging.insert("StartDateTime".into(), date_time(&self.check_in_date, self.check_in_time.as_deref()));
        lodging.insert("EndDateTime".into(), date_time(&self.check_out_date, self.check_out_time.as_deref()));
        if let Some(address) = self.address {
            lodging.insert("Address".into(), json!({ "address": address }));
        }
        insert_opt(&mut lodging, "supplier_conf_num", self.confirmation_number);
        if let Some(guests) = self.number_guests {
            lodging.insert("number_guests".into(), json!(guests.to_string()));
        }

        (self.trip_id, Value::Object(lodging))
    }
}

/// One car rental.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CarDetails {
    pub trip_id: Option<String>,
    pub company: String,
    pub pickup_date: String,
    pub dropoff_date: String,
    pub pickup_time: Option<String>,
    pub dropoff_time: Option<String>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub car_type: Option<String>,
    pub confirmation_number: Option<String>,
}

impl CarDetails {
    fn into_payload(self) -> (Option<String>, Value) {
        let mut car = Map::new();
        car.insert("supplier_name".into(), json!(self.company));
        car.insert("StartDateTime".into(), date_time(&self.pickup_date, self.pickup_time.as_deref()));
        car.insert("EndDateTime".into(), date_time(&self.dropoff_date, self.dropoff_time.as_deref()));
        insert_opt(&mut car, "start_location_name", self.pickup_location);
        insert_opt(&mut car, "end_location_name", self.dropoff_location);
        insert_opt(&mut car, "car_type", self.car_type);
        insert_opt(&mut car, "supplier_conf_num", self.confirmation_number);

        (self.trip_id, Value::Object(car))
    }
}

/// One activity, tour or event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActivityDetails {
    pub trip_id: Option<String>,
    pub name: String,
    pub start_date: String,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
}

impl ActivityDetails {
    fn into_payload(self) -> (Option<String>, Value) {
        let mut activity = Map::new();
        activity.insert("display_name".into(), json!(self.name));
        activity.insert("StartDateTime".into(), date_time(&self.start_date, self.start_time.as_deref()));
        if let Some(date) = self.end_date.as_deref() {
            activity.insert("EndDateTime".into(), date_time(date, self.end_time.as_deref()));
        }
        insert_opt(&mut activity, "location_name", self.location_name);
        if let Some(address) = self.address {
            activity.insert("Address".into(), json!({ "address": address }));
        }

        (self.trip_id, Value::Object(activity))
    }
}

fn date_time(date: &str, time: Option<&str>) -> Value {
    match time {
        Some(time) => json!({ "date": date, "time": time }),
        None => json!({ "date": date }),
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value));
    }
}

/// `/{prefix}/{kind}/id/{id}`. Dot segments would be resolved away by URL
/// parsing and address a different endpoint, so they are refused.
fn id_path(prefix: &str, kind: ObjectType, id: &str) -> TripItResult<String> {
    if id.trim().is_empty() || id == "." || id == ".." {
        return Err(TripItError::InvalidInput(format!("Invalid {} ID: '{}'", kind, id)));
    }
    Ok(format!("/{}/{}/id/{}", prefix, kind, percent_encode(id)))
}

fn payload_key(kind: ObjectType, action: &str) -> TripItResult<&'static str> {
    kind.payload_key().ok_or_else(|| {
        TripItError::InvalidInput(format!("Cannot {} objects of type: {}", action, kind))
    })
}

/// Provider operations bound to one user's credential pair.
pub struct TripItSession<'a> {
    client: &'a ResilientClient,
    credentials: CredentialPair,
}

impl<'a> TripItSession<'a> {
    pub(crate) fn new(client: &'a ResilientClient, credentials: CredentialPair) -> Self {
        Self { client, credentials }
    }

    async fn get(&self, endpoint: Endpoint) -> TripItResult<Value> {
        self.client
            .request(Method::GET, &endpoint, None, &self.credentials)
            .await
    }

    async fn post(&self, path: String, body: Value) -> TripItResult<Value> {
        self.client
            .request(Method::POST, &Endpoint::new(path), Some(&body), &self.credentials)
            .await
    }

    // Trips

    pub async fn list_trips(&self, query: &ListTripsQuery) -> TripItResult<Value> {
        let endpoint = Endpoint::new("/list/trip")
            .flag("past", query.past)
            .query_opt("modified_since", query.modified_since.as_deref())
            .flag("include_objects", query.include_objects)
            .query_opt("traveler", query.traveler.as_deref())
            .query("page_num", query.page_num)
            .query("page_size", query.page_size);
        self.get(endpoint).await
    }

    pub async fn get_trip(&self, trip_id: &str, include_objects: bool) -> TripItResult<Value> {
        let endpoint = Endpoint::new(id_path("get", ObjectType::Trip, trip_id)?)
            .flag("include_objects", include_objects);
        self.get(endpoint).await
    }

    pub async fn create_trip(&self, trip: Value) -> TripItResult<Value> {
        self.post("/create".into(), json!({ "Trip": trip })).await
    }

    /// Full replacement, not a partial update.
    pub async fn update_trip(&self, trip_id: &str, trip: Value) -> TripItResult<Value> {
        self.post(id_path("replace", ObjectType::Trip, trip_id)?, json!({ "Trip": trip }))
            .await
    }

    pub async fn delete_trip(&self, trip_id: &str) -> TripItResult<Value> {
        self.get(Endpoint::new(id_path("delete", ObjectType::Trip, trip_id)?))
            .await
    }

    pub async fn search_trips(&self, query: &SearchTripsQuery) -> TripItResult<Value> {
        let endpoint = Endpoint::new("/list/trip")
            .query("search_text", &query.query)
            .flag("past", query.past)
            .query("page_num", query.page_num)
            .query("page_size", query.page_size);
        self.get(endpoint).await
    }

    // Travel objects

    pub async fn list_objects(&self, kind: ObjectType, query: &ListObjectsQuery) -> TripItResult<Value> {
        let endpoint = Endpoint::new(format!("/list/{}", kind))
            .query_opt("trip_id", query.trip_id.as_deref())
            .flag("past", query.past)
            .query("page_num", query.page_num)
            .query("page_size", query.page_size);
        self.get(endpoint).await
    }

    pub async fn get_object(&self, kind: ObjectType, object_id: &str) -> TripItResult<Value> {
        self.get(Endpoint::new(id_path("get", kind, object_id)?)).await
    }

    /// Create an object, optionally attaching it to a trip.
    ///
    /// Read-only kinds are rejected before any request is made.
    pub async fn create_object(
        &self,
        kind: ObjectType,
        mut data: Value,
        trip_id: Option<&str>,
    ) -> TripItResult<Value> {
        let key = payload_key(kind, "create")?;
        if let (Some(trip_id), Some(fields)) = (trip_id, data.as_object_mut()) {
            fields.insert("trip_id".into(), Value::String(trip_id.to_string()));
        }
        self.post("/create".into(), json!({ key: data })).await
    }

    /// Full replacement, not a partial update.
    pub async fn update_object(&self, kind: ObjectType, object_id: &str, data: Value) -> TripItResult<Value> {
        let key = payload_key(kind, "update")?;
        self.post(id_path("replace", kind, object_id)?, json!({ key: data }))
            .await
    }

    pub async fn delete_object(&self, kind: ObjectType, object_id: &str) -> TripItResult<Value> {
        self.get(Endpoint::new(id_path("delete", kind, object_id)?)).await
    }

    pub async fn create_flight(&self, details: FlightDetails) -> TripItResult<Value> {
        let (trip_id, payload) = details.into_payload();
        self.create_object(ObjectType::Air, payload, trip_id.as_deref())
            .await
    }

    pub async fn create_hotel(&self, details: HotelDetails) -> TripItResult<Value> {
        let (trip_id, payload) = details.into_payload();
        self.create_object(ObjectType::Lodging, payload, trip_id.as_deref())
            .await
    }

    pub async fn create_car(&self, details: CarDetails) -> TripItResult<Value> {
        let (trip_id, payload) = details.into_payload();
        self.create_object(ObjectType::Car, payload, trip_id.as_deref())
            .await
    }

    pub async fn create_activity(&self, details: ActivityDetails) -> TripItResult<Value> {
        let (trip_id, payload) = details.into_payload();
        self.create_object(ObjectType::Activity, payload, trip_id.as_deref())
            .await
    }

    // Pro features

    /// Fetch an air object and require live status on its first segment.
    ///
    /// A missing `Status` is taken to mean the account lacks TripIt Pro.
    /// The provider exposes no explicit capability flag, so this is a guess.
    pub async fn get_flight_status(&self, air_id: &str) -> TripItResult<Value> {
        let result = self.get_object(ObjectType::Air, air_id).await?;

        let first_segment = match air_object(&result).get("Segment") {
            Some(Value::Array(segments)) => segments.first(),
            Some(segment @ Value::Object(_)) => Some(segment),
            _ => None,
        };

        if let Some(segment) = first_segment {
            if segment.get("Status").is_none() {
                return Err(TripItError::ProRequired(
                    "Flight status requires TripIt Pro subscription".into(),
                ));
            }
        }

        Ok(result)
    }

    pub async fn list_points_programs(&self) -> TripItResult<Value> {
        self.get(Endpoint::new(format!("/list/{}", ObjectType::PointsProgram)))
            .await
    }

    /// Rebooking URL for an air object, if the provider offers one.
    pub async fn get_alternate_flights(&self, air_id: &str) -> TripItResult<Option<String>> {
        let result = self.get_object(ObjectType::Air, air_id).await?;
        Ok(air_object(&result)
            .get("alternate_flights_url")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    pub async fn get_profile(&self) -> TripItResult<Value> {
        self.get(Endpoint::new("/get/profile")).await
    }
}

fn air_object(result: &Value) -> &Value {
    result.get("AirObject").unwrap_or(result)
}
