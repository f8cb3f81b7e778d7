pub mod artist;
pub mod artwork;
pub mod exhibition;
pub mod favorite;
pub mod message;
pub mod notification;
pub mod order;
pub mod review;
pub mod settings;
pub mod user;

pub use artist::{ArtistProfile, ArtistSummary, CreateArtistProfile, UpdateArtistProfile};
pub use artwork::{Artwork, ArtworkCard, ArtworkImage, ArtworkStatus, CreateArtwork, Facets, UpdateArtwork};
pub use exhibition::{CreateExhibition, Exhibition, UpdateExhibition};
pub use favorite::Favorite;
pub use message::{Message, SendMessage};
pub use notification::{Notification, NotificationKind};
pub use order::{CreateOrder, CreateOrderItem, Order, OrderItem, OrderStatus, ShippingAddress};
pub use review::{CreateReview, RatingSummary, Review, ReviewWithAuthor};
pub use settings::{Setting, SiteSettings, UpdateSiteSettings};
pub use user::{CreateUser, Role, User, UserFilter};
