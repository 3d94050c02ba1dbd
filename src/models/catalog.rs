//! Fixed menus offered by the studio: themes, characters, art styles, age groups
//! and sticker styles, together with the scene pools used for photo composites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn slug(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! catalog_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            /// Accepts the label or the variant name, ignoring case and punctuation.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = slug(s);
                $(
                    if wanted == slug($label) || wanted == slug(stringify!($variant)) {
                        return Ok($name::$variant);
                    }
                )+
                Err(format!(
                    "unknown {} '{}', expected one of: {}",
                    stringify!($name),
                    s,
                    $name::ALL.iter().map(|v| v.label()).collect::<Vec<_>>().join(", ")
                ))
            }
        }
    };
}

catalog_enum!(Theme {
    Christmas => "Christmas",
    Easter => "Easter",
    Summer => "Summer Fun",
    Birthday => "Birthday",
    Fantasy => "Fantasy",
    Everyday => "Everyday Fun",
});

impl Theme {
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Christmas => "🎄",
            Theme::Easter => "🐰",
            Theme::Summer => "🏖️",
            Theme::Birthday => "🎉",
            Theme::Fantasy => "✨",
            Theme::Everyday => "🎈",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Theme::Christmas => "Festive holiday magic",
            Theme::Easter => "Spring celebration",
            Theme::Summer => "Beach & adventure",
            Theme::Birthday => "Party celebration",
            Theme::Fantasy => "Magical worlds",
            Theme::Everyday => "Daily joy & play",
        }
    }
}

catalog_enum!(Character {
    Santa => "Santa",
    EasterBunny => "Easter Bunny",
    Superhero => "Superhero",
    Fairy => "Fairy",
    Dragon => "Dragon",
    Unicorn => "Unicorn",
    Princess => "Princess",
    Knight => "Knight",
    Pirate => "Pirate",
    Mermaid => "Mermaid",
    Robot => "Robot",
    Dinosaur => "Dinosaur",
    JungleAnimal => "Jungle Animal",
    Barbie => "Barbie",
    SpaceExplorer => "Space Explorer",
    DisneyPrincess => "Disney Princess",
    Lego => "Lego Character",
    Minecraft => "Minecraft Character",
    Roblox => "Roblox Character",
    Mario => "Super Mario",
    PawPatrol => "Paw Patrol",
});

impl Character {
    pub fn locations(&self) -> &'static [&'static str] {
        match self {
            Character::Santa => &["Workshop with elves", "Sleigh with reindeer", "Fireplace with tree", "Snow cabin"],
            Character::EasterBunny => &["Spring meadow", "Egg hunt garden", "Bunny warren", "Basket workshop"],
            Character::Superhero => &["City skyline", "HQ", "Flying through clouds", "Saving the day"],
            Character::Fairy => &["Enchanted forest", "Fairy garden", "Mushroom circle", "Starlit castle"],
            Character::Dragon => &["Mountain cave treasure", "Flying over castle", "Training grounds"],
            Character::Unicorn => &["Rainbow meadow", "Castle grounds", "Magical forest", "Cloud kingdom"],
            Character::Princess => &["Ballroom", "Royal garden", "Throne room", "Tower balcony"],
            Character::Knight => &["Castle courtyard", "Dragon quest", "Tournament", "Medieval village"],
            Character::Pirate => &["Ship deck", "Treasure island", "Secret cove", "Shipwreck"],
            Character::Mermaid => &["Coral reef", "Grotto palace", "Ocean rock", "Sunken treasure"],
            Character::Robot => &["Futuristic lab", "Space station", "Robot factory", "Cyber city"],
            Character::Dinosaur => &["Jurassic jungle", "Volcano", "Prehistoric swamp", "Nest"],
            Character::JungleAnimal => &["Rainforest", "Treehouse", "Safari", "Waterfall"],
            Character::Barbie => &["Dreamhouse", "Fashion Runway", "Pink Convertible", "Malibu Beach"],
            Character::SpaceExplorer => &["Moon Base", "Rocket Ship", "Alien Planet", "Space Station"],
            Character::DisneyPrincess => &["Magic Castle", "Enchanted Garden", "Royal Ballroom", "Wishing Well"],
            Character::Lego => &["Lego City", "Brick Castle", "Construction Site", "Lego Park"],
            Character::Minecraft => &["Block World", "Diamond Mine", "Village", "Nether Portal"],
            Character::Roblox => &["Obby Course", "Blox City", "Pet World", "Theme Park"],
            Character::Mario => &["Mushroom Kingdom", "Rainbow Road", "Peach's Castle", "Pipe World"],
            Character::PawPatrol => &["Lookout Tower", "Adventure Bay", "Fire Station", "Jungle Rescue"],
        }
    }

    pub fn poses(&self) -> &'static [&'static str] {
        match self {
            Character::Santa => &["Reading wish list", "High-five", "Sitting on lap", "Decorating tree"],
            Character::EasterBunny => &["Holding basket", "Painting eggs", "Hiding behind bush", "Jumping"],
            Character::Superhero => &["Flying together", "Power pose", "High-five", "Team-up stance"],
            Character::Fairy => &["Casting spell", "Flying", "Sitting on flower", "Waving wand"],
            Character::Dragon => &["Roaring", "Flying", "Sleeping", "Guarding treasure"],
            Character::Unicorn => &["Galloping", "Rearing", "Grazing", "Magic sparkle"],
            Character::Princess => &["Royal wave", "Dancing at ball", "Crown ceremony", "Tea party"],
            Character::Knight => &["Sword salute", "Riding horse", "Guarding", "Kneeling"],
            Character::Pirate => &["Looking through telescope", "Holding map", "Sword fight", "Digging"],
            Character::Mermaid => &["Swimming", "Sitting on rock", "Playing harp", "Talking to fish"],
            Character::Robot => &["Scanning", "Building", "Processing", "Hovering"],
            Character::Dinosaur => &["Roaring", "Stomping", "Eating leaves", "Running"],
            Character::JungleAnimal => &["Climbing", "Running", "Sleeping", "Playing"],
            Character::Barbie => &["Strike a pose", "Waving", "Holding shopping bags", "Petting dog"],
            Character::SpaceExplorer => &["Floating in zero-g", "Planting flag", "Saluting", "Looking at stars"],
            Character::DisneyPrincess => &["Singing with birds", "Dancing", "Holding flower", "Curtsy"],
            Character::Lego => &["Building", "Standing stiff", "Waving", "Holding tool"],
            Character::Minecraft => &["Mining", "Holding sword", "Building block", "Taming wolf"],
            Character::Roblox => &["Jumping", "Dancing", "Waving", "Running"],
            Character::Mario => &["Jumping punch", "Peace sign", "Running", "Driving kart"],
            Character::PawPatrol => &["On the case", "Sliding down", "High paw", "Sitting good"],
        }
    }
}

catalog_enum!(
    /// How the companion character itself is depicted.
    Ethnicity {
        Classic => "Classic / Traditional",
        AfricanAmerican => "African American",
        Asian => "Asian",
        Hispanic => "Hispanic",
        Biracial => "Biracial / Mixed",
        Indian => "Indian / South Asian",
        MiddleEastern => "Middle Eastern",
    }
);

catalog_enum!(ArtStyle {
    Realistic => "Natural/Realistic",
    Vintage => "Vintage 1950s",
    Pixar => "3D Pixar-style",
    Watercolor => "Watercolor",
    OilPainting => "Oil Painting",
    Cartoon => "Cartoon",
});

catalog_enum!(AgeGroup {
    Toddler => "Toddler (2-3)",
    Preschool => "Preschool (4-5)",
    EarlyReader => "Early Reader (6-8)",
});

catalog_enum!(StickerStyle {
    Avatar3d => "3D Avatar",
    Chibi => "Chibi",
    Cartoon => "Cartoon",
    Superhero => "Superhero",
    Emoji => "Emoji",
    PixelArt => "Pixel Art",
});

catalog_enum!(
    /// Rendering of a storybook cover.
    CoverStyle {
        Colorful => "Colorful",
        Coloring => "Coloring",
    }
);

impl Default for Theme {
    fn default() -> Self {
        Theme::Christmas
    }
}

impl Default for Character {
    fn default() -> Self {
        Character::Santa
    }
}

impl Default for Ethnicity {
    fn default() -> Self {
        Ethnicity::Classic
    }
}

impl Default for ArtStyle {
    fn default() -> Self {
        ArtStyle::Realistic
    }
}

impl Default for AgeGroup {
    fn default() -> Self {
        AgeGroup::Preschool
    }
}

impl Default for StickerStyle {
    fn default() -> Self {
        StickerStyle::Avatar3d
    }
}

impl Default for CoverStyle {
    fn default() -> Self {
        CoverStyle::Colorful
    }
}
