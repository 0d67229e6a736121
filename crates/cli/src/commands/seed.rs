//! Seed the catalogue and the default admin account.
//!
//! Idempotent: products are only inserted into an empty catalogue, and the
//! admin is only created when its email is absent, so running `seed` twice
//! leaves the data unchanged.

use rust_decimal::Decimal;

use ambre_api::db::products::{NewProduct, ProductRepository};
use ambre_api::db::{AdminRepository, RepositoryError};
use ambre_api::services::auth::hash_password;
use ambre_core::Email;

const DEFAULT_ADMIN_EMAIL: &str = "admin@ambre-parfums.example";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Seed products and the default admin.
///
/// The admin password comes from `AMBRE_SEED_ADMIN_PASSWORD`; there is no
/// built-in default credential.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the password env var is
/// missing while the admin needs creating, or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let products = ProductRepository::new(&pool);
    let (existing, _) = products.stock_counts().await?;
    if existing > 0 {
        tracing::info!("catalogue already has {existing} products, skipping product seed");
    } else {
        for product in catalogue() {
            let name = product.name.clone();
            products.insert(product).await?;
            tracing::info!("seeded product: {name}");
        }
    }

    seed_admin(&pool).await?;

    Ok(())
}

async fn seed_admin(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let admins = AdminRepository::new(pool);

    let email = std::env::var("AMBRE_SEED_ADMIN_EMAIL")
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let email = Email::parse(&email)?;

    if admins.get_by_email(&email).await?.is_some() {
        tracing::info!("admin {email} already exists, skipping admin seed");
        return Ok(());
    }

    let password = std::env::var("AMBRE_SEED_ADMIN_PASSWORD")
        .map_err(|_| "AMBRE_SEED_ADMIN_PASSWORD must be set to seed the admin account")?;
    let password_hash = hash_password(&password)?;

    match admins
        .create(DEFAULT_ADMIN_USERNAME, &email, &password_hash, "Store Admin")
        .await
    {
        Ok(admin) => tracing::info!("seeded admin: {}", admin.email),
        // A concurrent seed can win the race; that's still a seeded admin
        Err(RepositoryError::Conflict(_)) => {
            tracing::info!("admin {email} already exists, skipping admin seed");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// The six launch perfumes.
fn catalogue() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Elysian Rose".to_string(),
            price: Decimal::from(185),
            description: "A luxurious blend of Damascus rose, peony, and warm amber. Elysian \
                          Rose captures the essence of a Mediterranean garden at sunset. Notes \
                          of bergamot and blackcurrant add a fresh, fruity opening that mellows \
                          into a heart of rich florals. The base reveals sandalwood and musk for \
                          a lingering, sophisticated finish."
                .to_string(),
            short_description: "Opulent rose with amber undertones".to_string(),
            image: "/assets/perfume1.jpg".to_string(),
            category: "floral".to_string(),
            featured: true,
            in_stock: true,
        },
        NewProduct {
            name: "Amber Noir".to_string(),
            price: Decimal::from(210),
            description: "An intoxicating oriental fragrance built around precious amber and \
                          dark woods. Amber Noir opens with spicy notes of cardamom and saffron, \
                          revealing a heart of Turkish rose and jasmine. The base is rich with \
                          vanilla, patchouli, and oud, creating a mysterious and sensual \
                          experience that lasts throughout the day."
                .to_string(),
            short_description: "Mysterious amber with spicy undertones".to_string(),
            image: "/assets/perfume2.jpg".to_string(),
            category: "oriental".to_string(),
            featured: true,
            in_stock: true,
        },
        NewProduct {
            name: "Velvet Orchid".to_string(),
            price: Decimal::from(165),
            description: "A seductive composition centered around rare orchid species. The \
                          fragrance begins with mandarin and honey, blooming into a heart of \
                          black orchid and jasmine. Base notes of suede, vanilla, and sandalwood \
                          create a smooth, velvety texture that embodies understated luxury and \
                          modern femininity."
                .to_string(),
            short_description: "Sensual orchid and smooth vanilla".to_string(),
            image: "/assets/perfume3.jpg".to_string(),
            category: "floral".to_string(),
            featured: false,
            in_stock: true,
        },
        NewProduct {
            name: "Aqua Sublime".to_string(),
            price: Decimal::from(155),
            description: "A refreshing marine fragrance that captures the essence of \
                          Mediterranean coastlines. Aqua Sublime opens with bright citrus and \
                          sea notes, developing into a heart of lavender and rosemary. The dry \
                          down reveals cedar and white musk, evoking the feeling of warm sun on \
                          coastal rocks."
                .to_string(),
            short_description: "Refreshing marine with citrus notes".to_string(),
            image: "/assets/perfume4.jpg".to_string(),
            category: "fresh".to_string(),
            featured: false,
            in_stock: true,
        },
        NewProduct {
            name: "Oud Royale".to_string(),
            price: Decimal::from(295),
            description: "A majestic fragrance centered around precious oud wood. This opulent \
                          perfume opens with saffron and spices, unfolding into a rich heart of \
                          Bulgarian rose and patchouli. The base is dominated by aged oud, \
                          amber, and leather, creating a long-lasting, regal impression that \
                          embodies true luxury."
                .to_string(),
            short_description: "Opulent oud with rose and spices".to_string(),
            image: "/assets/perfume5.jpg".to_string(),
            category: "woody".to_string(),
            featured: true,
            in_stock: true,
        },
        NewProduct {
            name: "Solar Bloom".to_string(),
            price: Decimal::from(175),
            description: "A radiant floral fragrance inspired by sun-drenched gardens. Solar \
                          Bloom features bright bergamot and mandarin, leading to a luminous \
                          heart of orange blossom and jasmine. The base of warm amber and musk \
                          creates a golden glow that embodies the feeling of perfect summer \
                          days."
                .to_string(),
            short_description: "Bright florals with citrus and amber".to_string(),
            image: "/assets/perfume6.jpg".to_string(),
            category: "floral".to_string(),
            featured: false,
            in_stock: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_well_formed() {
        let products = catalogue();
        assert_eq!(products.len(), 6);
        for product in &products {
            assert!(product.price > Decimal::ZERO);
            assert!(product.short_description.chars().count() <= 50);
            assert!(!product.description.is_empty());
        }
    }

    #[test]
    fn test_catalogue_has_featured_products() {
        assert_eq!(catalogue().iter().filter(|p| p.featured).count(), 3);
    }
}
