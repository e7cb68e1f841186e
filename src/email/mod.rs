pub mod job;
pub mod queue;
pub mod sender;
pub mod services;
pub mod worker;

pub use job::EmailJob;
pub use queue::{EmailQueue, MemoryEmailQueue, RedisEmailQueue};
pub use sender::{EmailSender, SmtpEmailSender};
