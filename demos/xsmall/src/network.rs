//! Embedded seed network: six Cape Town taxi ranks.
//!
//! Routes are one-directional rows.  The corridors between the CBD, Bellville
//! and Stellenbosch run both ways; Mitchells Plain is a feeder that routes
//! leave but none arrive at.

pub const RANKS_CSV: &str = "\
id,name,address,lat,lon
1,Cape Town CBD,Station Deck,-33.9249,18.4241
2,Bellville,Bellville Station,-33.9006,18.6296
3,Mitchells Plain,Town Centre,-34.0470,18.6180
4,Khayelitsha,Site C,-34.0400,18.6780
5,Wynberg,Main Road,-34.0003,18.4676
6,Stellenbosch,Bird Street,-33.9321,18.8602
";

pub const ROUTES_CSV: &str = "\
id,from,to,distance,fare_price,price,driver_split,association_split
1,1,2,22.5,18,35,70,30
2,2,1,22.5,18,35,70,30
3,2,4,19.0,16,30,60,40
4,4,2,19.0,16,30,60,40
5,1,5,12.0,14,20,70,30
6,5,1,12.0,14,20,70,30
7,3,5,17.5,15,25,65,35
8,3,4,8.0,10,,,
9,2,6,24.0,22,40,70,30
10,6,2,24.0,22,40,70,30
";
