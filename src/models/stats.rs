use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mock visitor analytics shown on the dashboard. The figures are not
/// derived from real traffic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitsStats {
    #[serde(default)]
    pub today_visits: u32,
    #[serde(default)]
    pub cities_count: u32,
    #[serde(default)]
    pub devices_count: u32,
    #[serde(default)]
    pub os_count: u32,
    #[serde(default)]
    pub continents_count: u32,
    #[serde(default)]
    pub daily_data: Vec<u32>,
    #[serde(default)]
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub location: String,
    pub time: String,
    /// `new` or `return`
    #[serde(rename = "type")]
    pub kind: String,
}

impl Activity {
    fn new(location: &str, time: &str, kind: &str) -> Self {
        Activity {
            location: location.to_string(),
            time: time.to_string(),
            kind: kind.to_string(),
        }
    }
}

const DEFAULT_DAILY: [u32; 30] = [
    45, 52, 38, 67, 89, 76, 95, 82, 71, 58, 63, 78, 85, 92, 88, 74, 69, 81, 94, 87, 73, 66, 79,
    91, 84, 77, 68, 83, 96, 89,
];

impl Default for VisitsStats {
    fn default() -> Self {
        VisitsStats {
            today_visits: 156,
            cities_count: 24,
            devices_count: 3,
            os_count: 4,
            continents_count: 3,
            daily_data: DEFAULT_DAILY.to_vec(),
            recent_activity: vec![
                Activity::new("الرياض", "منذ دقيقتين", "new"),
                Activity::new("جدة", "منذ 5 دقائق", "return"),
                Activity::new("الدمام", "منذ 10 دقائق", "new"),
                Activity::new("مكة المكرمة", "منذ 15 دقيقة", "return"),
            ],
        }
    }
}

impl VisitsStats {
    /// A fresh set of mock figures.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        VisitsStats {
            today_visits: rng.gen_range(100..150),
            cities_count: rng.gen_range(20..30),
            devices_count: 3,
            os_count: 4,
            continents_count: rng.gen_range(3..5),
            daily_data: (0..30).map(|_| rng.gen_range(30..90)).collect(),
            recent_activity: vec![
                Activity::new("الرياض", "الآن", "new"),
                Activity::new("جدة", "منذ دقيقة", "return"),
                Activity::new("الدمام", "منذ 3 دقائق", "new"),
                Activity::new("مكة المكرمة", "منذ 7 دقائق", "return"),
            ],
        }
    }

    pub fn peak(&self) -> u32 {
        self.daily_data.iter().copied().max().unwrap_or(0)
    }
}
