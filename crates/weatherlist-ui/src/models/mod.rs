pub mod weather_list;
