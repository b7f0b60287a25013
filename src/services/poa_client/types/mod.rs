pub mod route_detail_response;
pub mod route_record;
pub mod stop_record;
