//! Fixed tool catalog.

use std::str::FromStr;

use serde_json::{json, Value};

use crate::client::ObjectType;
use crate::tools::ToolDescriptor;

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ListTrips,
    GetTrip,
    CreateTrip,
    UpdateTrip,
    DeleteTrip,
    SearchTrips,
    ListObjects,
    GetObject,
    CreateObject,
    UpdateObject,
    DeleteObject,
    CreateFlight,
    CreateHotel,
    CreateCar,
    CreateActivity,
    GetFlightStatus,
    GetAlternateFlights,
    ListPointsPrograms,
    GetProfile,
}

impl Tool {
    /// Listing order for `tools/list`.
    pub const ALL: [Tool; 19] = [
        Tool::ListTrips,
        Tool::GetTrip,
        Tool::CreateTrip,
        Tool::UpdateTrip,
        Tool::DeleteTrip,
        Tool::SearchTrips,
        Tool::ListObjects,
        Tool::GetObject,
        Tool::CreateObject,
        Tool::UpdateObject,
        Tool::DeleteObject,
        Tool::CreateFlight,
        Tool::CreateHotel,
        Tool::CreateCar,
        Tool::CreateActivity,
        Tool::GetFlightStatus,
        Tool::GetAlternateFlights,
        Tool::ListPointsPrograms,
        Tool::GetProfile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::ListTrips => "tripit_list_trips",
            Tool::GetTrip => "tripit_get_trip",
            Tool::CreateTrip => "tripit_create_trip",
            Tool::UpdateTrip => "tripit_update_trip",
            Tool::DeleteTrip => "tripit_delete_trip",
            Tool::SearchTrips => "tripit_search_trips",
            Tool::ListObjects => "tripit_list_objects",
            Tool::GetObject => "tripit_get_object",
            Tool::CreateObject => "tripit_create_object",
            Tool::UpdateObject => "tripit_update_object",
            Tool::DeleteObject => "tripit_delete_object",
            Tool::CreateFlight => "tripit_create_flight",
            Tool::CreateHotel => "tripit_create_hotel",
            Tool::CreateCar => "tripit_create_car",
            Tool::CreateActivity => "tripit_create_activity",
            Tool::GetFlightStatus => "tripit_get_flight_status",
            Tool::GetAlternateFlights => "tripit_get_alternate_flights",
            Tool::ListPointsPrograms => "tripit_list_points_programs",
            Tool::GetProfile => "tripit_get_profile",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::ListTrips => "List the user's trips. Upcoming trips by default; set include_past for completed ones.",
            Tool::GetTrip => "Get one trip by ID, including its travel objects by default.",
            Tool::CreateTrip => "Create a new trip.",
            Tool::UpdateTrip => "Replace a trip. This is a full replacement, not a partial update.",
            Tool::DeleteTrip => "Delete a trip and everything in it.",
            Tool::SearchTrips => "Search trips by free text.",
            Tool::ListObjects => "List travel objects (flights, hotels, cars, ...) of one type.",
            Tool::GetObject => "Get one travel object by type and ID.",
            Tool::CreateObject => "Create a travel object of any creatable type from raw TripIt fields.",
            Tool::UpdateObject => "Replace a travel object. This is a full replacement, not a partial update.",
            Tool::DeleteObject => "Delete a travel object.",
            Tool::CreateFlight => "Add a flight segment, optionally to an existing trip.",
            Tool::CreateHotel => "Add a hotel stay, optionally to an existing trip.",
            Tool::CreateCar => "Add a car rental, optionally to an existing trip.",
            Tool::CreateActivity => "Add an activity, tour or event, optionally to an existing trip.",
            Tool::GetFlightStatus => "Real-time flight status (TripIt Pro).",
            Tool::GetAlternateFlights => "Link to alternate flight options for a booked flight (TripIt Pro).",
            Tool::ListPointsPrograms => "List loyalty and points programs (TripIt Pro).",
            Tool::GetProfile => "Get the authenticated user's TripIt profile.",
        }
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            Tool::ListTrips => object(
                json!({
                    "include_past": {"type": "boolean", "description": "Include completed trips"},
                    "modified_since": {"type": "string", "description": "Only trips modified since this timestamp"},
                    "include_objects": {"type": "boolean", "description": "Embed travel objects"},
                    "traveler": {"type": "string", "enum": ["true", "false", "all"]},
                    "page_num": page_num(),
                    "page_size": page_size(),
                }),
                &[],
            ),
            Tool::GetTrip => object(
                json!({
                    "trip_id": id("Trip ID"),
                    "include_objects": {"type": "boolean", "default": true},
                }),
                &["trip_id"],
            ),
            Tool::CreateTrip => object(
                json!({
                    "display_name": {"type": "string"},
                    "start_date": date(),
                    "end_date": date(),
                    "primary_location": {"type": "string"},
                    "description": {"type": "string"},
                }),
                &["display_name", "start_date", "end_date"],
            ),
            Tool::UpdateTrip => object(
                json!({
                    "trip_id": id("Trip ID"),
                    "trip": {"type": "object", "description": "Complete trip fields"},
                }),
                &["trip_id", "trip"],
            ),
            Tool::DeleteTrip => object(json!({ "trip_id": id("Trip ID") }), &["trip_id"]),
            Tool::SearchTrips => object(
                json!({
                    "query": {"type": "string"},
                    "include_past": {"type": "boolean"},
                    "page_num": page_num(),
                    "page_size": page_size(),
                }),
                &["query"],
            ),
            Tool::ListObjects => object(
                json!({
                    "object_type": object_type(),
                    "trip_id": id("Only objects in this trip"),
                    "include_past": {"type": "boolean"},
                    "page_num": page_num(),
                    "page_size": page_size(),
                }),
                &["object_type"],
            ),
            Tool::GetObject | Tool::DeleteObject => object(
                json!({
                    "object_type": object_type(),
                    "object_id": id("Object ID"),
                }),
                &["object_type", "object_id"],
            ),
            Tool::CreateObject => object(
                json!({
                    "object_type": object_type(),
                    "data": {"type": "object", "description": "TripIt object fields"},
                    "trip_id": id("Trip to attach the object to"),
                }),
                &["object_type", "data"],
            ),
            Tool::UpdateObject => object(
                json!({
                    "object_type": object_type(),
                    "object_id": id("Object ID"),
                    "data": {"type": "object", "description": "Complete object fields"},
                }),
                &["object_type", "object_id", "data"],
            ),
            Tool::CreateFlight => object(
                json!({
                    "trip_id": id("Trip to attach the flight to"),
                    "airline_code": {"type": "string", "description": "IATA airline code, e.g. UA"},
                    "flight_number": {"type": "string"},
                    "departure_airport": {"type": "string", "description": "IATA airport code"},
                    "arrival_airport": {"type": "string", "description": "IATA airport code"},
                    "departure_date": date(),
                    "departure_time": time(),
                    "arrival_date": date(),
                    "arrival_time": time(),
                    "confirmation_number": {"type": "string"},
                    "seat": {"type": "string"},
                }),
                &[
                    "airline_code",
                    "flight_number",
                    "departure_airport",
                    "arrival_airport",
                    "departure_date",
                ],
            ),
            Tool::CreateHotel => object(
                json!({
                    "trip_id": id("Trip to attach the stay to"),
                    "hotel_name": {"type": "string"},
                    "check_in_date": date(),
                    "check_out_date": date(),
                    "check_in_time": time(),
                    "check_out_time": time(),
                    "address": {"type": "string"},
                    "confirmation_number": {"type": "string"},
                    "number_guests": {"type": "integer", "minimum": 1},
                }),
                &["hotel_name", "check_in_date", "check_out_date"],
            ),
            Tool::CreateCar => object(
                json!({
                    "trip_id": id("Trip to attach the rental to"),
                    "company": {"type": "string"},
                    "pickup_date": date(),
                    "dropoff_date": date(),
                    "pickup_time": time(),
                    "dropoff_time": time(),
                    "pickup_location": {"type": "string"},
                    "dropoff_location": {"type": "string"},
                    "car_type": {"type": "string"},
                    "confirmation_number": {"type": "string"},
                }),
                &["company", "pickup_date", "dropoff_date"],
            ),
            Tool::CreateActivity => object(
                json!({
                    "trip_id": id("Trip to attach the activity to"),
                    "name": {"type": "string"},
                    "start_date": date(),
                    "start_time": time(),
                    "end_date": date(),
                    "end_time": time(),
                    "location_name": {"type": "string"},
                    "address": {"type": "string"},
                }),
                &["name", "start_date"],
            ),
            Tool::GetFlightStatus | Tool::GetAlternateFlights => {
                object(json!({ "air_id": id("Air object ID") }), &["air_id"])
            }
            Tool::ListPointsPrograms | Tool::GetProfile => object(json!({}), &[]),
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn id(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn date() -> Value {
    json!({"type": "string", "description": "YYYY-MM-DD"})
}

fn time() -> Value {
    json!({"type": "string", "description": "HH:MM:SS"})
}

fn page_num() -> Value {
    json!({"type": "integer", "minimum": 1, "default": 1})
}

fn page_size() -> Value {
    json!({"type": "integer", "minimum": 1, "maximum": 100, "default": 25})
}

fn object_type() -> Value {
    let kinds: Vec<&str> = ObjectType::ALL.iter().map(ObjectType::as_str).collect();
    json!({"type": "string", "enum": kinds})
}
