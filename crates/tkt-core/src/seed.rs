//! Demo tickets inserted the first time a store is created

use chrono::{DateTime, Duration, Utc};

use crate::id::seed_ticket_id;
use crate::{Status, Ticket};

struct DemoTicket {
    name: &'static str,
    phone: &'static str,
    description: &'static str,
    address: &'static str,
    /// Created this long before `now`
    age: Duration,
    status: Status,
    assigned_to: &'static str,
    /// Started this long after creation
    started_after: Option<Duration>,
    /// Completed this long after creation
    completed_after: Option<Duration>,
    root_cause: &'static str,
    actions_taken: &'static str,
    fee: u64,
}

fn demo_data() -> [DemoTicket; 5] {
    [
        DemoTicket {
            name: "Anh Minh",
            phone: "0909123456",
            description: "Máy lạnh không lạnh, chạy kêu to",
            address: "Phòng 302, Tòa A",
            age: Duration::days(2),
            status: Status::Completed,
            assigned_to: "Quang",
            started_after: Some(Duration::hours(1)),
            completed_after: Some(Duration::hours(2)),
            root_cause: "Thiếu gas, lọc bẩn",
            actions_taken: "Đổ gas R32, vệ sinh lọc, kiểm tra toàn bộ hệ thống",
            fee: 450_000,
        },
        DemoTicket {
            name: "Chị Hoa",
            phone: "0912345678",
            description: "Ống nước bị rò rỉ dưới bồn rửa",
            address: "Nhà 15, Ngõ 123",
            age: Duration::days(1),
            status: Status::Completed,
            assigned_to: "Nhật",
            started_after: Some(Duration::minutes(30)),
            completed_after: Some(Duration::minutes(90)),
            root_cause: "Ống nối bị lỏng, ron cao su hư",
            actions_taken: "Thay ron cao su mới, vặn chặt ống nối",
            fee: 150_000,
        },
        DemoTicket {
            name: "Anh Tuấn",
            phone: "0923456789",
            description: "Tivi không lên hình, có tiếng",
            address: "Căn 506, Chung cư B",
            age: Duration::hours(6),
            status: Status::InProgress,
            assigned_to: "Hiếu",
            started_after: Some(Duration::hours(1)),
            completed_after: None,
            root_cause: "",
            actions_taken: "",
            fee: 0,
        },
        DemoTicket {
            name: "Chị Lan",
            phone: "0934567890",
            description: "Máy giặt không vắt, chỉ giặt được",
            address: "Số 8, Đường XYZ",
            age: Duration::hours(2),
            status: Status::Waiting,
            assigned_to: "",
            started_after: None,
            completed_after: None,
            root_cause: "",
            actions_taken: "",
            fee: 0,
        },
        DemoTicket {
            name: "Anh Dũng",
            phone: "0945678901",
            description: "Quạt trần quay chậm, rung lắc",
            address: "Phòng 102",
            age: Duration::hours(1),
            status: Status::Waiting,
            assigned_to: "",
            started_after: None,
            completed_after: None,
            root_cause: "",
            actions_taken: "",
            fee: 0,
        },
    ]
}

/// Build the demo dataset relative to `now`
///
/// Five tickets across all three statuses; every record satisfies
/// `created_at <= in_progress_at <= completed_at`.
pub fn demo_tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let millis = now.timestamp_millis();

    demo_data()
        .into_iter()
        .enumerate()
        .map(|(i, demo)| {
            let created_at = now - demo.age;
            Ticket {
                id: seed_ticket_id(millis, i + 1),
                name: demo.name.to_string(),
                phone: demo.phone.to_string(),
                address: demo.address.to_string(),
                description: demo.description.to_string(),
                images: Vec::new(),
                created_at,
                status: demo.status,
                assigned_to: demo.assigned_to.to_string(),
                in_progress_at: demo.started_after.map(|d| created_at + d),
                completed_at: demo.completed_after.map(|d| created_at + d),
                root_cause: demo.root_cause.to_string(),
                actions_taken: demo.actions_taken.to_string(),
                fee: demo.fee,
            }
        })
        .collect()
}
