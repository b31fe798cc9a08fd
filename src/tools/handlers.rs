//! Tool handlers backed by the resilient client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::api::{
    ActivityDetails, CarDetails, FlightDetails, HotelDetails, ListObjectsQuery, ListTripsQuery,
    SearchTripsQuery, DEFAULT_PAGE_SIZE,
};
use crate::client::{ObjectType, ResilientClient, TripItSession};
use crate::oauth::CredentialPair;
use crate::observability::metrics;
use crate::tools::render::{render_error, render_payload, ToolError};
use crate::tools::{Tool, ToolDescriptor, ToolResult, ToolRouter};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListTripsArgs {
    include_past: bool,
    modified_since: Option<String>,
    include_objects: bool,
    traveler: Option<String>,
    page_num: Option<u32>,
    page_size: Option<u32>,
}

impl From<ListTripsArgs> for ListTripsQuery {
    fn from(args: ListTripsArgs) -> Self {
        Self {
            past: args.include_past,
            modified_since: args.modified_since,
            include_objects: args.include_objects,
            traveler: args.traveler,
            page_num: args.page_num.unwrap_or(1),
            page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GetTripArgs {
    trip_id: String,
    #[serde(default = "yes")]
    include_objects: bool,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize)]
struct CreateTripArgs {
    display_name: String,
    start_date: String,
    end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateTripArgs {
    trip_id: String,
    trip: Value,
}

#[derive(Debug, Deserialize)]
struct TripIdArgs {
    trip_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchTripsArgs {
    query: String,
    #[serde(default)]
    include_past: bool,
    page_num: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ListObjectsArgs {
    object_type: ObjectType,
    trip_id: Option<String>,
    #[serde(default)]
    include_past: bool,
    page_num: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ObjectRefArgs {
    object_type: ObjectType,
    object_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateObjectArgs {
    object_type: ObjectType,
    data: Value,
    trip_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateObjectArgs {
    object_type: ObjectType,
    object_id: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct AirIdArgs {
    air_id: String,
}

fn parse<T: DeserializeOwned>(tool: Tool, arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool: tool.name(),
        message: e.to_string(),
    })
}

/// The TripIt tool catalog.
#[derive(Debug, Clone)]
pub struct TripItTools {
    client: Arc<ResilientClient>,
}

impl TripItTools {
    pub fn new(client: Arc<ResilientClient>) -> Self {
        Self { client }
    }

    async fn run(
        &self,
        tool: Tool,
        arguments: Value,
        credentials: Option<&CredentialPair>,
    ) -> Result<Value, ToolError> {
        let credentials = credentials.ok_or(ToolError::NotConnected)?;
        let session = self.client.session(credentials.clone());
        dispatch(&session, tool, arguments).await
    }
}

async fn dispatch(session: &TripItSession<'_>, tool: Tool, arguments: Value) -> Result<Value, ToolError> {
    match tool {
        Tool::ListTrips => {
            let args: ListTripsArgs = parse(tool, arguments)?;
            session
                .list_trips(&args.into())
                .await
                .map_err(|e| ToolError::api(e, None))
        }
        Tool::GetTrip => {
            let args: GetTripArgs = parse(tool, arguments)?;
            session
                .get_trip(&args.trip_id, args.include_objects)
                .await
                .map_err(|e| ToolError::api(e, Some(args.trip_id.as_str())))
        }
        Tool::CreateTrip => {
            let args: CreateTripArgs = parse(tool, arguments)?;
            let trip = serde_json::to_value(&args).map_err(|e| ToolError::InvalidArguments {
                tool: tool.name(),
                message: e.to_string(),
            })?;
            session.create_trip(trip).await.map_err(|e| ToolError::api(e, None))
        }
        Tool::UpdateTrip => {
            let args: UpdateTripArgs = parse(tool, arguments)?;
            session
                .update_trip(&args.trip_id, args.trip)
                .await
                .map_err(|e| ToolError::api(e, Some(args.trip_id.as_str())))
        }
        Tool::DeleteTrip => {
            let args: TripIdArgs = parse(tool, arguments)?;
            session
                .delete_trip(&args.trip_id)
                .await
                .map_err(|e| ToolError::api(e, Some(args.trip_id.as_str())))
        }
        Tool::SearchTrips => {
            let args: SearchTripsArgs = parse(tool, arguments)?;
            let query = SearchTripsQuery {
                query: args.query,
                past: args.include_past,
                page_num: args.page_num.unwrap_or(1),
                page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            };
            session.search_trips(&query).await.map_err(|e| ToolError::api(e, None))
        }
        Tool::ListObjects => {
            let args: ListObjectsArgs = parse(tool, arguments)?;
            let query = ListObjectsQuery {
                trip_id: args.trip_id,
                past: args.include_past,
                page_num: args.page_num.unwrap_or(1),
                page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            };
            session
                .list_objects(args.object_type, &query)
                .await
                .map_err(|e| ToolError::api(e, query.trip_id.as_deref()))
        }
        Tool::GetObject => {
            let args: ObjectRefArgs = parse(tool, arguments)?;
            session
                .get_object(args.object_type, &args.object_id)
                .await
                .map_err(|e| ToolError::api(e, Some(args.object_id.as_str())))
        }
        Tool::CreateObject => {
            let args: CreateObjectArgs = parse(tool, arguments)?;
            session
                .create_object(args.object_type, args.data, args.trip_id.as_deref())
                .await
                .map_err(|e| ToolError::api(e, args.trip_id.as_deref()))
        }
        Tool::UpdateObject => {
            let args: UpdateObjectArgs = parse(tool, arguments)?;
            session
                .update_object(args.object_type, &args.object_id, args.data)
                .await
                .map_err(|e| ToolError::api(e, Some(args.object_id.as_str())))
        }
        Tool::DeleteObject => {
            let args: ObjectRefArgs = parse(tool, arguments)?;
            session
                .delete_object(args.object_type, &args.object_id)
                .await
                .map_err(|e| ToolError::api(e, Some(args.object_id.as_str())))
        }
        Tool::CreateFlight => {
            let details: FlightDetails = parse(tool, arguments)?;
            let trip_id = details.trip_id.clone();
            session
                .create_flight(details)
                .await
                .map_err(|e| ToolError::api(e, trip_id.as_deref()))
        }
        Tool::CreateHotel => {
            let details: HotelDetails = parse(tool, arguments)?;
            let trip_id = details.trip_id.clone();
            session
                .create_hotel(details)
                .await
                .map_err(|e| ToolError::api(e, trip_id.as_deref()))
        }
        Tool::CreateCar => {
            let details: CarDetails = parse(tool, arguments)?;
            let trip_id = details.trip_id.clone();
            session
                .create_car(details)
                .await
                .map_err(|e| ToolError::api(e, trip_id.as_deref()))
        }
        Tool::CreateActivity => {
            let details: ActivityDetails = parse(tool, arguments)?;
            let trip_id = details.trip_id.clone();
            session
                .create_activity(details)
                .await
                .map_err(|e| ToolError::api(e, trip_id.as_deref()))
        }
        Tool::GetFlightStatus => {
            let args: AirIdArgs = parse(tool, arguments)?;
            session
                .get_flight_status(&args.air_id)
                .await
                .map_err(|e| ToolError::api(e, Some(args.air_id.as_str())))
        }
        Tool::GetAlternateFlights => {
            let args: AirIdArgs = parse(tool, arguments)?;
            let url = session
                .get_alternate_flights(&args.air_id)
                .await
                .map_err(|e| ToolError::api(e, Some(args.air_id.as_str())))?;
            Ok(json!({ "air_id": args.air_id, "alternate_flights_url": url }))
        }
        Tool::ListPointsPrograms => session
            .list_points_programs()
            .await
            .map_err(|e| ToolError::api(e, None)),
        Tool::GetProfile => session.get_profile().await.map_err(|e| ToolError::api(e, None)),
    }
}

/// Bounded metric label: caller-supplied names never reach the recorder.
fn metric_label(tool: Option<Tool>) -> &'static str {
    tool.map(|tool| tool.name()).unwrap_or("unknown")
}

#[async_trait]
impl ToolRouter for TripItTools {
    fn list_descriptors(&self) -> Vec<ToolDescriptor> {
        Tool::ALL.iter().map(Tool::descriptor).collect()
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        credentials: Option<&CredentialPair>,
    ) -> ToolResult {
        let tool = name.parse::<Tool>().ok();
        let label = metric_label(tool);
        let outcome = match tool {
            Some(tool) => self.run(tool, arguments, credentials).await,
            None => Err(ToolError::UnknownTool(name.to_string())),
        };

        match outcome {
            Ok(payload) => {
                metrics::record_tool_call(label, "success");
                render_payload(&payload)
            }
            Err(error) => {
                tracing::warn!(tool = %name, kind = error.kind(), error = %error, "Tool call failed");
                metrics::record_tool_call(label, error.kind());
                render_error(&error)
            }
        }
    }
}
