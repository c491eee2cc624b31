//! Closed vocabularies of the unified schema
//!
//! Each enum serializes to its canonical token, the same token the
//! search index stores as a keyword.

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

macro_rules! canonical_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $token)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical token
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    other => Err(ValidationError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

canonical_enum! {
    /// Kind of vehicle a record describes
    TransportType as "transport_type" {
        Plane => "plane",
        Automobile => "automobile",
        Train => "train",
    }
}

impl TransportType {
    /// The only provider allowed to emit records of this type
    pub fn expected_source(self) -> DataSource {
        match self {
            TransportType::Plane => DataSource::Faa,
            TransportType::Automobile => DataSource::Nhtsa,
            TransportType::Train => DataSource::Trainline,
        }
    }
}

canonical_enum! {
    /// Upstream provider of a record
    DataSource as "metadata.source" {
        Faa => "faa",
        Nhtsa => "nhtsa",
        Trainline => "trainline",
    }
}

canonical_enum! {
    RegistrationStatus as "registration_status" {
        Active => "active",
        Inactive => "inactive",
        Pending => "pending",
        Expired => "expired",
        Deregistered => "deregistered",
    }
}

canonical_enum! {
    /// Legal form of the registered owner
    OwnerType as "owner.type" {
        Individual => "individual",
        Partnership => "partnership",
        Corporation => "corporation",
        CoOwned => "co_owned",
        Government => "government",
        Llc => "llc",
        NonCitizenCorporation => "non_citizen_corporation",
        NonCitizenCoOwned => "non_citizen_co_owned",
        Other => "other",
    }
}

canonical_enum! {
    AircraftType as "plane_data.aircraft_type" {
        Glider => "glider",
        Balloon => "balloon",
        Blimp => "blimp",
        FixedWingSingle => "fixed_wing_single",
        FixedWingMulti => "fixed_wing_multi",
        Rotorcraft => "rotorcraft",
        WeightShiftControl => "weight_shift_control",
        PoweredParachute => "powered_parachute",
        Gyroplane => "gyroplane",
        HybridLift => "hybrid_lift",
        Other => "other",
    }
}

canonical_enum! {
    /// Aircraft engine family
    EngineType as "specifications.engine_type" {
        NoEngine => "none",
        Reciprocating => "reciprocating",
        TurboProp => "turbo-prop",
        TurboShaft => "turbo-shaft",
        TurboJet => "turbo-jet",
        TurboFan => "turbo-fan",
        Ramjet => "ramjet",
        TwoCycle => "2-cycle",
        FourCycle => "4-cycle",
        Unknown => "unknown",
        Electric => "electric",
        Rotary => "rotary",
    }
}

canonical_enum! {
    AirworthinessClass as "plane_data.airworthiness_class" {
        Standard => "standard",
        Limited => "limited",
        Restricted => "restricted",
        Experimental => "experimental",
        Provisional => "provisional",
        Multiple => "multiple",
        Primary => "primary",
        SpecialFlightPermit => "special_flight_permit",
        LightSport => "light_sport",
    }
}

canonical_enum! {
    PowerUnit as "specifications.power.unit" {
        Hp => "hp",
        Kw => "kw",
    }
}

canonical_enum! {
    DriveType as "automobile_data.drive_type" {
        Fwd => "FWD",
        Rwd => "RWD",
        Awd => "AWD",
        FourWd => "4WD",
        Unknown => "unknown",
    }
}
